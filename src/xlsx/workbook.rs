//! Workbook implementation for Excel chat-log files.
//!
//! Opens the `.xlsx` container from a path or an in-memory byte buffer
//! (uploads arrive as bytes, never as files on disk) and materializes one
//! [`SheetTable`] per worksheet, keyed by sheet name, in workbook order.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use crate::common::xml::unescape_xml;
use crate::common::{Error, Result};
use crate::sheet::SheetTable;

use super::worksheet::{CellContext, SheetInfo, parse_worksheet_xml};
use super::{SharedStrings, Styles, attribute};

/// A chat-log workbook, decoded lazily one worksheet at a time.
pub struct Workbook<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
    sheets: Vec<SheetInfo>,
    /// Relationship id -> archive part name
    targets: HashMap<String, String>,
    shared_strings: SharedStrings,
    styles: Styles,
    date1904: bool,
}

impl Workbook<BufReader<File>> {
    /// Open a workbook from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl Workbook<Cursor<Vec<u8>>> {
    /// Open a workbook from an in-memory byte buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes.into()))
    }
}

impl<R: Read + Seek> Workbook<R> {
    /// Open a workbook from any seekable reader.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader).map_err(|err| match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::NotSpreadsheet,
        })?;

        let manifest = match read_part(&mut archive, "xl/workbook.xml") {
            Ok(content) => content,
            // A ZIP without a workbook manifest is not a spreadsheet
            Err(Error::ComponentNotFound(_)) => return Err(Error::NotSpreadsheet),
            Err(err) => return Err(err),
        };
        let (sheets, date1904) = parse_workbook_manifest(&manifest)?;

        let targets = match read_part(&mut archive, "xl/_rels/workbook.xml.rels") {
            Ok(content) => parse_relationships(&content),
            Err(_) => {
                tracing::warn!("workbook has no relationships part, using sheet-id part names");
                HashMap::new()
            },
        };

        let shared_strings = match read_part(&mut archive, "xl/sharedStrings.xml") {
            Ok(content) => SharedStrings::parse(&content)?,
            Err(_) => SharedStrings::new(),
        };
        let styles = match read_part(&mut archive, "xl/styles.xml") {
            Ok(content) => Styles::parse(&content)?,
            Err(_) => Styles::new(),
        };

        tracing::debug!(sheets = sheets.len(), date1904, "parsed workbook manifest");

        Ok(Workbook {
            archive,
            sheets,
            targets,
            shared_strings,
            styles,
            date1904,
        })
    }

    /// Get all worksheet names, in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// Get the number of worksheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Decode every worksheet into a named table, in workbook order.
    pub fn sheet_tables(&mut self) -> Result<Vec<(String, SheetTable)>> {
        let infos = self.sheets.clone();
        let mut tables = Vec::with_capacity(infos.len());
        for info in &infos {
            let table = self.sheet_table(info)?;
            tracing::debug!(sheet = %info.name, rows = table.row_count(), "decoded worksheet");
            tables.push((info.name.clone(), table));
        }
        Ok(tables)
    }

    fn sheet_table(&mut self, info: &SheetInfo) -> Result<SheetTable> {
        let part_name = self
            .targets
            .get(&info.relationship_id)
            .cloned()
            .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", info.sheet_id));
        let content = read_part(&mut self.archive, &part_name)?;

        let ctx = CellContext {
            shared_strings: &self.shared_strings,
            styles: &self.styles,
            date1904: self.date1904,
        };
        let mut rows = parse_worksheet_xml(&content, &ctx)?;
        if rows.is_empty() {
            return Ok(SheetTable::default());
        }

        // First materialized row is the header
        let header = rows.remove(0);
        let columns = header.iter().map(|cell| cell.to_display_string()).collect();
        Ok(SheetTable::new(columns, rows))
    }
}

/// Read one archive part as UTF-8 text.
fn read_part<R: Read + Seek>(archive: &mut zip::ZipArchive<R>, name: &str) -> Result<String> {
    let mut part = archive.by_name(name).map_err(|err| match err {
        zip::result::ZipError::FileNotFound => Error::ComponentNotFound(name.to_string()),
        other => Error::from(other),
    })?;
    let mut content = String::new();
    part.read_to_string(&mut content)?;
    Ok(content)
}

/// Parse workbook.xml: the sheet list and the date-system flag.
fn parse_workbook_manifest(content: &str) -> Result<(Vec<SheetInfo>, bool)> {
    let bytes = content.as_bytes();
    let mut sheets = Vec::new();

    if let Some(sheets_start) = memchr::memmem::find(bytes, b"<sheets>")
        && let Some(sheets_end) = memchr::memmem::find(&bytes[sheets_start..], b"</sheets>")
    {
        let section = &content[sheets_start..sheets_start + sheets_end];
        let section_bytes = section.as_bytes();
        let mut pos = 0;
        while let Some(sheet_pos) = memchr::memmem::find(&section_bytes[pos..], b"<sheet ") {
            let tag_start = pos + sheet_pos;
            let Some(tag_end) = memchr::memchr(b'>', &section_bytes[tag_start..]) else {
                break;
            };
            let tag = &section[tag_start..tag_start + tag_end + 1];

            let name = attribute(tag, "name").map(unescape_xml).unwrap_or_default();
            let sheet_id = attribute(tag, "sheetId")
                .and_then(|v| atoi_simd::parse::<u32, false, false>(v.as_bytes()).ok())
                .unwrap_or(sheets.len() as u32 + 1);
            let relationship_id = attribute(tag, "r:id").unwrap_or_default().to_string();

            sheets.push(SheetInfo {
                name,
                relationship_id,
                sheet_id,
            });
            pos = tag_start + tag_end + 1;
        }
    }

    let date1904 = memchr::memmem::find(bytes, b"<workbookPr")
        .and_then(|pr_start| {
            let tag_end = memchr::memchr(b'>', &bytes[pr_start..])?;
            attribute(&content[pr_start..pr_start + tag_end + 1], "date1904")
                .map(|v| v == "1" || v == "true")
        })
        .unwrap_or(false);

    Ok((sheets, date1904))
}

/// Parse workbook.xml.rels into relationship id -> part name.
fn parse_relationships(content: &str) -> HashMap<String, String> {
    let bytes = content.as_bytes();
    let mut targets = HashMap::new();
    let mut pos = 0;

    while let Some(rel_pos) = memchr::memmem::find(&bytes[pos..], b"<Relationship ") {
        let tag_start = pos + rel_pos;
        let Some(tag_end) = memchr::memchr(b'>', &bytes[tag_start..]) else {
            break;
        };
        let tag = &content[tag_start..tag_start + tag_end + 1];

        if let Some(id) = attribute(tag, "Id")
            && let Some(target) = attribute(tag, "Target")
        {
            // Targets are relative to xl/ unless they start at the package root
            let part = match target.strip_prefix('/') {
                Some(absolute) => absolute.to_string(),
                None => format!("xl/{target}"),
            };
            targets.insert(id.to_string(), part);
        }
        pos = tag_start + tag_end + 1;
    }

    targets
}
