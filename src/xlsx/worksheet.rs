//! Worksheet parsing for Excel files.
//!
//! Turns one worksheet part's `<sheetData>` into dense rows of [`CellValue`].
//! Shared-string references are resolved during parsing and numeric cells are
//! promoted to timestamps through the style table, so the returned rows carry
//! final values only.

use std::collections::HashMap;

use crate::common::datetime::from_excel_serial;
use crate::common::xml::unescape_xml;
use crate::common::{Error, Result};
use crate::sheet::CellValue;

use super::shared_strings::{SharedStrings, extract_text};
use super::styles::Styles;
use super::attribute;

/// Information about a worksheet, from the workbook manifest.
#[derive(Debug, Clone)]
pub struct SheetInfo {
    /// Worksheet name
    pub name: String,
    /// Relationship ID linking the manifest entry to its part
    pub relationship_id: String,
    /// Sheet ID
    pub sheet_id: u32,
}

/// Parsing context shared by every cell of one worksheet.
pub(crate) struct CellContext<'a> {
    pub shared_strings: &'a SharedStrings,
    pub styles: &'a Styles,
    /// Workbook uses the 1904 date system
    pub date1904: bool,
}

/// Parse a worksheet part into dense rows, ordered by row number.
///
/// Sparse grids are densified: gaps between the sheet's min and max columns
/// become `Empty` cells so every row has the same width.
pub(crate) fn parse_worksheet_xml(content: &str, ctx: &CellContext<'_>) -> Result<Vec<Vec<CellValue>>> {
    let mut cells: HashMap<u32, HashMap<u32, CellValue>> = HashMap::new();
    let mut min_row = u32::MAX;
    let mut max_row = 0u32;
    let mut min_col = u32::MAX;
    let mut max_col = 0u32;

    let bytes = content.as_bytes();
    let Some(data_start) = memchr::memmem::find(bytes, b"<sheetData") else {
        return Ok(Vec::new());
    };
    let Some(data_tag_end) = memchr::memchr(b'>', &bytes[data_start..]) else {
        return Err(Error::ParseError("unterminated sheetData tag".to_string()));
    };
    if bytes[data_start + data_tag_end - 1] == b'/' {
        // <sheetData/> - an empty sheet
        return Ok(Vec::new());
    }
    let data_end = memchr::memmem::find(&bytes[data_start..], b"</sheetData>")
        .map(|end| data_start + end)
        .ok_or_else(|| Error::ParseError("unterminated sheetData section".to_string()))?;
    let sheet_data = &content[data_start + data_tag_end + 1..data_end];

    let mut fallback_row = 0u32;
    let mut pos = 0;
    let data_bytes = sheet_data.as_bytes();
    while let Some(row_pos) = memchr::memmem::find(&data_bytes[pos..], b"<row") {
        let row_start = pos + row_pos;
        // Guard against matching a longer tag name
        match data_bytes.get(row_start + 4) {
            Some(b' ') | Some(b'>') | Some(b'/') => {},
            _ => {
                pos = row_start + 4;
                continue;
            },
        }
        let Some(tag_end) = memchr::memchr(b'>', &data_bytes[row_start..]) else {
            break;
        };
        let tag = &sheet_data[row_start..row_start + tag_end + 1];
        fallback_row += 1;
        let row_num = attribute(tag, "r")
            .and_then(|v| atoi_simd::parse::<u32, false, false>(v.as_bytes()).ok())
            .unwrap_or(fallback_row);
        fallback_row = row_num;

        if data_bytes[row_start + tag_end - 1] == b'/' {
            // Self-closing row: present but has no cells
            min_row = min_row.min(row_num);
            max_row = max_row.max(row_num);
            pos = row_start + tag_end + 1;
            continue;
        }
        let body_start = row_start + tag_end + 1;
        let Some(row_end) = memchr::memmem::find(&data_bytes[body_start..], b"</row>") else {
            break;
        };
        let row_content = &sheet_data[body_start..body_start + row_end];

        min_row = min_row.min(row_num);
        max_row = max_row.max(row_num);
        let row_cells = cells.entry(row_num).or_default();
        for (col_num, value) in parse_row_cells(row_content, ctx)? {
            min_col = min_col.min(col_num);
            max_col = max_col.max(col_num);
            row_cells.insert(col_num, value);
        }

        pos = body_start + row_end + 6;
    }

    if min_row > max_row || min_col > max_col {
        return Ok(Vec::new());
    }

    let width = (max_col - min_col + 1) as usize;
    let mut rows = Vec::with_capacity((max_row - min_row + 1) as usize);
    for row_num in min_row..=max_row {
        let mut row = vec![CellValue::Empty; width];
        if let Some(row_cells) = cells.get_mut(&row_num) {
            for (col_num, value) in row_cells.drain() {
                row[(col_num - min_col) as usize] = value;
            }
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Parse every `<c>` element of one row into (column, value) pairs.
fn parse_row_cells(row_content: &str, ctx: &CellContext<'_>) -> Result<Vec<(u32, CellValue)>> {
    let bytes = row_content.as_bytes();
    let mut cells = Vec::new();
    let mut fallback_col = 0u32;
    let mut pos = 0;

    while let Some(c_pos) = memchr::memmem::find(&bytes[pos..], b"<c") {
        let c_start = pos + c_pos;
        match bytes.get(c_start + 2) {
            Some(b' ') | Some(b'>') | Some(b'/') => {},
            _ => {
                pos = c_start + 2;
                continue;
            },
        }
        let Some(tag_end) = memchr::memchr(b'>', &bytes[c_start..]) else {
            break;
        };
        let tag = &row_content[c_start..c_start + tag_end + 1];

        fallback_col += 1;
        let col_num = attribute(tag, "r")
            .and_then(|reference| reference_to_coords(reference).ok())
            .map(|(col, _row)| col)
            .unwrap_or(fallback_col);
        fallback_col = col_num;

        if bytes[c_start + tag_end - 1] == b'/' {
            // Self-closing cell: styled but valueless
            cells.push((col_num, CellValue::Empty));
            pos = c_start + tag_end + 1;
            continue;
        }
        let body_start = c_start + tag_end + 1;
        let Some(c_end) = memchr::memmem::find(&bytes[body_start..], b"</c>") else {
            break;
        };
        let body = &row_content[body_start..body_start + c_end];

        let cell_type = attribute(tag, "t");
        let style_index = attribute(tag, "s")
            .and_then(|v| atoi_simd::parse::<usize, false, false>(v.as_bytes()).ok());
        cells.push((col_num, parse_cell_value(cell_type, style_index, body, ctx)));

        pos = body_start + c_end + 4;
    }

    Ok(cells)
}

/// Decode one cell's value from its type attribute and element body.
fn parse_cell_value(
    cell_type: Option<&str>,
    style_index: Option<usize>,
    body: &str,
    ctx: &CellContext<'_>,
) -> CellValue {
    let value = element_text(body, b"<v>", b"</v>");

    match (cell_type, value) {
        (Some("s"), Some(v)) => {
            // Shared string reference
            match atoi_simd::parse::<usize, false, false>(v.as_bytes())
                .ok()
                .and_then(|index| ctx.shared_strings.get(index))
            {
                Some(text) => CellValue::String(text.to_string()),
                None => CellValue::Error("Invalid shared string reference".to_string()),
            }
        },
        (Some("str"), Some(v)) => CellValue::String(unescape_xml(v)),
        (Some("inlineStr"), _) => CellValue::String(extract_text(body)),
        (Some("b"), Some(v)) => match v {
            "1" => CellValue::Bool(true),
            "0" => CellValue::Bool(false),
            _ => CellValue::Error("Invalid boolean value".to_string()),
        },
        (Some("e"), Some(v)) => CellValue::Error(v.to_string()),
        (_, Some(v)) => parse_numeric_value(v, style_index, ctx),
        _ => CellValue::Empty,
    }
}

/// Parse an untyped `<v>` body: number, date-styled serial, or stray text.
fn parse_numeric_value(v: &str, style_index: Option<usize>, ctx: &CellContext<'_>) -> CellValue {
    let is_date = style_index.is_some_and(|s| ctx.styles.is_date_style(s));

    if let Ok(int_val) = atoi_simd::parse::<i64, false, false>(v.as_bytes()) {
        if is_date && let Some(dt) = from_excel_serial(int_val as f64, ctx.date1904) {
            return CellValue::DateTime(dt);
        }
        return CellValue::Int(int_val);
    }
    if let Ok(float_val) = fast_float2::parse::<f64, _>(v) {
        if is_date && let Some(dt) = from_excel_serial(float_val, ctx.date1904) {
            return CellValue::DateTime(dt);
        }
        return CellValue::Float(float_val);
    }
    CellValue::String(unescape_xml(v))
}

/// Extract the text between a start and end tag within one element body.
fn element_text<'a>(body: &'a str, start: &[u8], end: &[u8]) -> Option<&'a str> {
    let bytes = body.as_bytes();
    let start_pos = memchr::memmem::find(bytes, start)? + start.len();
    let end_pos = memchr::memmem::find(&bytes[start_pos..], end)? + start_pos;
    Some(&body[start_pos..end_pos])
}

/// Convert an Excel reference (e.g., "B7") to (column, row) numbers, 1-based.
pub(crate) fn reference_to_coords(reference: &str) -> Result<(u32, u32)> {
    let mut col_num = 0u32;
    let mut row_start = reference.len();

    for (i, ch) in reference.char_indices() {
        if ch.is_ascii_alphabetic() {
            col_num = col_num * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        } else {
            row_start = i;
            break;
        }
    }

    if col_num == 0 {
        return Err(Error::ParseError(format!(
            "Invalid cell reference: {reference}"
        )));
    }
    let row_num = reference[row_start..]
        .parse::<u32>()
        .map_err(|_| Error::ParseError(format!("Invalid row number in reference: {reference}")))?;

    Ok((col_num, row_num))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx<'a>(shared: &'a SharedStrings, styles: &'a Styles) -> CellContext<'a> {
        CellContext {
            shared_strings: shared,
            styles,
            date1904: false,
        }
    }

    #[test]
    fn test_reference_to_coords() {
        assert_eq!(reference_to_coords("A1").unwrap(), (1, 1));
        assert_eq!(reference_to_coords("E10").unwrap(), (5, 10));
        assert_eq!(reference_to_coords("AA100").unwrap(), (27, 100));
        assert!(reference_to_coords("123").is_err());
    }

    #[test]
    fn test_parse_basic_grid() {
        let shared = SharedStrings::parse("<sst><si><t>Token</t></si></sst>").unwrap();
        let styles = Styles::new();
        let xml = r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="str"><v>hi</v></c></row>
<row r="2"><c r="A2"><v>42</v></c><c r="B2"><v>2.5</v></c></row>
</sheetData></worksheet>"#;
        let rows = parse_worksheet_xml(xml, &ctx(&shared, &styles)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], CellValue::String("Token".to_string()));
        assert_eq!(rows[0][1], CellValue::String("hi".to_string()));
        assert_eq!(rows[1][0], CellValue::Int(42));
        assert_eq!(rows[1][1], CellValue::Float(2.5));
    }

    #[test]
    fn test_sparse_rows_densified() {
        let shared = SharedStrings::new();
        let styles = Styles::new();
        let xml = r#"<sheetData>
<row r="1"><c r="A1"><v>1</v></c><c r="C1"><v>3</v></c></row>
<row r="3"><c r="B3"><v>2</v></c></row>
</sheetData>"#;
        let rows = parse_worksheet_xml(xml, &ctx(&shared, &styles)).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![
            CellValue::Int(1),
            CellValue::Empty,
            CellValue::Int(3)
        ]);
        // Row 2 is absent from the part but present in the grid
        assert!(rows[1].iter().all(|c| c.is_empty()));
        assert_eq!(rows[2][1], CellValue::Int(2));
    }

    #[test]
    fn test_self_closing_cells_and_rows() {
        let shared = SharedStrings::new();
        let styles = Styles::new();
        let xml = r#"<sheetData>
<row r="1"><c r="A1" s="0"/><c r="B1"><v>7</v></c></row>
<row r="2"/>
</sheetData>"#;
        let rows = parse_worksheet_xml(xml, &ctx(&shared, &styles)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], CellValue::Empty);
        assert_eq!(rows[0][1], CellValue::Int(7));
        assert!(rows[1].iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_date_styled_serial_becomes_datetime() {
        let shared = SharedStrings::new();
        let styles = Styles::parse(
            r#"<styleSheet><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="22"/></cellXfs></styleSheet>"#,
        )
        .unwrap();
        let xml = r#"<sheetData><row r="1"><c r="A1" s="1"><v>45292.5</v></c></row></sheetData>"#;
        let rows = parse_worksheet_xml(xml, &ctx(&shared, &styles)).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(rows[0][0], CellValue::DateTime(expected));
    }

    #[test]
    fn test_inline_string_and_error_cells() {
        let shared = SharedStrings::new();
        let styles = Styles::new();
        let xml = r#"<sheetData><row r="1">
<c r="A1" t="inlineStr"><is><t>direct</t></is></c>
<c r="B1" t="e"><v>#DIV/0!</v></c>
<c r="C1" t="b"><v>1</v></c>
</row></sheetData>"#;
        let rows = parse_worksheet_xml(xml, &ctx(&shared, &styles)).unwrap();
        assert_eq!(rows[0][0], CellValue::String("direct".to_string()));
        assert_eq!(rows[0][1], CellValue::Error("#DIV/0!".to_string()));
        assert_eq!(rows[0][2], CellValue::Bool(true));
    }

    #[test]
    fn test_empty_sheet_data() {
        let shared = SharedStrings::new();
        let styles = Styles::new();
        let rows =
            parse_worksheet_xml("<worksheet><sheetData/></worksheet>", &ctx(&shared, &styles))
                .unwrap();
        assert!(rows.is_empty());
    }
}
