//! Styles parsing for Excel files.
//!
//! Only one question matters to this crate: is a numeric cell date-formatted?
//! Serial numbers and ordinary numbers are indistinguishable in the cell
//! itself; the cell's `s=` index points into `cellXfs`, whose `numFmtId`
//! either is a built-in date format or refers to a custom format code.

use std::collections::HashMap;

use crate::common::Result;
use crate::common::xml::unescape_xml;

use super::attribute;

/// Number format information.
#[derive(Debug, Clone)]
pub struct NumberFormat {
    /// Format ID
    pub id: u32,
    /// Format code (e.g., "General", "yyyy-mm-dd hh:mm")
    pub code: String,
}

/// Styles collection.
#[derive(Debug, Default)]
pub struct Styles {
    /// Custom number formats, by format ID
    number_formats: HashMap<u32, NumberFormat>,
    /// numFmtId per cell XF, in declaration order
    cell_xfs: Vec<u32>,
}

impl Styles {
    /// Create a new empty styles collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse styles from xl/styles.xml content.
    pub fn parse(content: &str) -> Result<Self> {
        let mut styles = Styles::default();
        let bytes = content.as_bytes();

        if let Some(section) = section(content, b"<numFmts", b"</numFmts>") {
            let section_bytes = section.as_bytes();
            let mut pos = 0;
            while let Some(fmt_pos) = memchr::memmem::find(&section_bytes[pos..], b"<numFmt ") {
                let tag_start = pos + fmt_pos;
                let Some(tag_end) = memchr::memchr(b'>', &section_bytes[tag_start..]) else {
                    break;
                };
                let tag = &section[tag_start..tag_start + tag_end + 1];
                if let Some(id) = attribute(tag, "numFmtId")
                    && let Ok(id) = atoi_simd::parse::<u32, false, false>(id.as_bytes())
                    && let Some(code) = attribute(tag, "formatCode")
                {
                    styles.number_formats.insert(
                        id,
                        NumberFormat {
                            id,
                            code: unescape_xml(code),
                        },
                    );
                }
                pos = tag_start + tag_end + 1;
            }
        }

        if let Some(xfs_start) = memchr::memmem::find(bytes, b"<cellXfs") {
            let xfs_end = memchr::memmem::find(&bytes[xfs_start..], b"</cellXfs>")
                .map(|end| xfs_start + end)
                .unwrap_or(content.len());
            let section = &content[xfs_start..xfs_end];
            let section_bytes = section.as_bytes();
            let mut pos = 0;
            while let Some(xf_pos) = memchr::memmem::find(&section_bytes[pos..], b"<xf ") {
                let tag_start = pos + xf_pos;
                let Some(tag_end) = memchr::memchr(b'>', &section_bytes[tag_start..]) else {
                    break;
                };
                let tag = &section[tag_start..tag_start + tag_end + 1];
                let fmt_id = attribute(tag, "numFmtId")
                    .and_then(|v| atoi_simd::parse::<u32, false, false>(v.as_bytes()).ok())
                    .unwrap_or(0);
                styles.cell_xfs.push(fmt_id);
                pos = tag_start + tag_end + 1;
            }
        }

        Ok(styles)
    }

    /// Get a number format by ID.
    pub fn get_number_format(&self, id: u32) -> Option<&NumberFormat> {
        self.number_formats.get(&id)
    }

    /// Check whether a cell's style index refers to a date/time format.
    pub fn is_date_style(&self, xf_index: usize) -> bool {
        let Some(&fmt_id) = self.cell_xfs.get(xf_index) else {
            return false;
        };
        is_builtin_date_format(fmt_id)
            || self
                .number_formats
                .get(&fmt_id)
                .is_some_and(|fmt| code_has_date_tokens(&fmt.code))
    }
}

/// Extract the text between a start tag prefix and an end tag.
fn section<'a>(content: &'a str, start: &[u8], end: &[u8]) -> Option<&'a str> {
    let bytes = content.as_bytes();
    let start_pos = memchr::memmem::find(bytes, start)?;
    let end_pos = memchr::memmem::find(&bytes[start_pos..], end)? + start_pos;
    Some(&content[start_pos..end_pos])
}

/// Built-in date/time number formats (ECMA-376 §18.8.30).
fn is_builtin_date_format(id: u32) -> bool {
    matches!(id, 14..=22 | 45..=47)
}

/// Heuristic for custom format codes: any date/time token outside quoted
/// literals and bracketed sections marks the format as a date.
fn code_has_date_tokens(code: &str) -> bool {
    let mut in_bracket = false;
    let mut in_quote = false;
    for ch in code.chars() {
        match ch {
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            '"' => in_quote = !in_quote,
            'y' | 'm' | 'd' | 'h' | 's' | 'Y' | 'M' | 'D' | 'H' | 'S'
                if !in_bracket && !in_quote =>
            {
                return true;
            },
            _ => {},
        }
    }
    false
}
