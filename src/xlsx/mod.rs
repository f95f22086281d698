//! Workbook ingestion for Excel (.xlsx) chat-log files.
//!
//! The container is a ZIP archive of XML parts. Parts are scanned with
//! memchr rather than a full XML parser; the subset of SpreadsheetML that
//! chat-log exports produce is flat enough that tag/attribute scanning is
//! both faster and simpler.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chatbook::xlsx::Workbook;
//!
//! let mut workbook = Workbook::open("chatlogs.xlsx")?;
//! for (name, table) in workbook.sheet_tables()? {
//!     println!("{name}: {} rows", table.row_count());
//! }
//! # Ok::<(), chatbook::Error>(())
//! ```

mod shared_strings;
mod styles;
mod workbook;
mod worksheet;

pub use shared_strings::SharedStrings;
pub use styles::Styles;
pub use workbook::Workbook;
pub use worksheet::SheetInfo;

/// Extract an attribute value from a single XML tag.
///
/// The pattern includes the leading space so that `Id` never matches inside
/// `sheetId`. Returns the raw (still-escaped) value slice.
pub(crate) fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let pattern = format!(" {name}=\"");
    let start = memchr::memmem::find(tag.as_bytes(), pattern.as_bytes())? + pattern.len();
    let end = memchr::memchr(b'"', &tag.as_bytes()[start..])? + start;
    Some(&tag[start..end])
}
