//! Chatbook - session summaries and transcripts from chat-log workbooks
//!
//! Hotels export their guest-chat logs as Excel workbooks: one sheet per
//! hotel, rows of timestamped messages, and a sparse `Token` column marking
//! which conversation each row opens. This library decodes those workbooks
//! and computes, per sheet, a session summary (longest conversation and
//! distinct-guest count) and an ordered transcript grouped by conversation.
//!
//! # Example - Reporting over a workbook file
//!
//! ```no_run
//! use chatbook::report::{RenderOptions, WorkbookReport};
//! use chatbook::xlsx::Workbook;
//!
//! # fn main() -> chatbook::Result<()> {
//! let mut workbook = Workbook::open("chatlogs.xlsx")?;
//! let sheets = workbook.sheet_tables()?;
//!
//! let report = WorkbookReport::build(&sheets, &RenderOptions::default());
//! for (sheet, result) in &report.summaries {
//!     println!("{sheet}: {result:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Uploaded bytes
//!
//! ```no_run
//! use chatbook::xlsx::Workbook;
//!
//! # fn main() -> chatbook::Result<()> {
//! # let upload: Vec<u8> = Vec::new();
//! // Web handlers hold the upload in memory; no file ever hits disk
//! let mut workbook = Workbook::from_bytes(upload)?;
//! println!("Sheets: {:?}", workbook.sheet_names());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Pre-decoded tables
//!
//! ```
//! use chatbook::report::{summarize, TOKEN_COLUMN, DATE_TIME_COLUMN};
//! use chatbook::sheet::{CellValue, SheetTable};
//!
//! let table = SheetTable::new(
//!     vec![TOKEN_COLUMN.to_string(), DATE_TIME_COLUMN.to_string()],
//!     vec![
//!         vec![
//!             CellValue::Int(1),
//!             CellValue::String("2024-01-01 10:00".to_string()),
//!         ],
//!         vec![
//!             CellValue::Empty,
//!             CellValue::String("2024-01-01 10:30".to_string()),
//!         ],
//!     ],
//! );
//!
//! let summary = summarize(&table).unwrap();
//! assert_eq!(summary.max_duration_minutes, 30);
//! ```

/// Shared infrastructure: errors, date/time coercion, XML text handling
pub mod common;

/// Per-sheet analysis passes and workbook-level aggregation
///
/// The session summary and transcript passes are pure functions over a
/// [`sheet::SheetTable`]; `WorkbookReport` runs them independently per sheet
/// and converts each failure into that sheet's marker string.
pub mod report;

/// In-memory table model for worksheet data
pub mod sheet;

/// Workbook ingestion for Excel (.xlsx) chat-log files
pub mod xlsx;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use report::{
    RenderOptions, SessionSummary, SummaryResult, TranscriptDocument, TranscriptResult,
    WorkbookReport,
};
pub use sheet::{CellValue, SheetTable};
pub use xlsx::Workbook;
