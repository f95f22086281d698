//! Per-sheet analysis passes and workbook-level aggregation.
//!
//! Two independent passes run over every sheet: the session summary and the
//! transcript rendering. Each pass's failure is caught at the sheet boundary
//! and converted to a marker string, so one bad sheet (or one bad pass)
//! never suppresses the rest of the workbook.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chatbook::xlsx::Workbook;
//! use chatbook::report::{RenderOptions, WorkbookReport};
//!
//! let mut workbook = Workbook::open("chatlogs.xlsx")?;
//! let sheets = workbook.sheet_tables()?;
//! let report = WorkbookReport::build(&sheets, &RenderOptions::default());
//! for (sheet, result) in &report.summaries {
//!     println!("{sheet}: {result:?}");
//! }
//! # Ok::<(), chatbook::Error>(())
//! ```

pub mod summary;
pub mod token;
pub mod transcript;

use serde::Serialize;

use crate::sheet::SheetTable;

pub use summary::{SessionSummary, summarize};
pub use transcript::{
    MessagePair, RenderOptions, TranscriptDocument, TranscriptGroup, render,
};

/// Group identifier column.
pub const TOKEN_COLUMN: &str = "Token";
/// Timestamp column used by the summary pass.
pub const DATE_TIME_COLUMN: &str = "Date/Time";
/// Guest-side message column.
pub const GUEST_MESSAGES_COLUMN: &str = "Guest messages";
/// Bot-side message column.
pub const BOT_MESSAGES_COLUMN: &str = "Bebot messages";

/// Outcome of the summary pass for one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SummaryResult {
    Summary(SessionSummary),
    Error(String),
}

impl SummaryResult {
    /// Check whether this sheet's summary pass failed.
    pub fn is_error(&self) -> bool {
        matches!(self, SummaryResult::Error(_))
    }
}

/// Outcome of the transcript pass for one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TranscriptResult {
    Transcript(TranscriptDocument),
    Error(String),
}

impl TranscriptResult {
    /// Check whether this sheet's transcript pass failed.
    pub fn is_error(&self) -> bool {
        matches!(self, TranscriptResult::Error(_))
    }
}

/// Both passes' results for every sheet, in workbook order.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct WorkbookReport {
    pub summaries: Vec<(String, SummaryResult)>,
    pub transcripts: Vec<(String, TranscriptResult)>,
}

impl WorkbookReport {
    /// Run both passes over every sheet.
    pub fn build(sheets: &[(String, SheetTable)], options: &RenderOptions) -> Self {
        let mut summaries = Vec::with_capacity(sheets.len());
        let mut transcripts = Vec::with_capacity(sheets.len());

        for (name, table) in sheets {
            let summary = match summary::summarize(table) {
                Ok(s) => SummaryResult::Summary(s),
                Err(err) => {
                    tracing::warn!(sheet = %name, %err, "summary pass failed");
                    SummaryResult::Error(summary_error_marker(name))
                },
            };
            summaries.push((name.clone(), summary));

            let transcript = match transcript::render(table, options) {
                Ok(doc) => TranscriptResult::Transcript(doc),
                Err(err) => {
                    tracing::warn!(sheet = %name, %err, "transcript pass failed");
                    TranscriptResult::Error(transcript_error_marker(name))
                },
            };
            transcripts.push((name.clone(), transcript));
        }

        WorkbookReport {
            summaries,
            transcripts,
        }
    }
}

/// Marker text for a sheet whose summary pass failed.
pub fn summary_error_marker(sheet: &str) -> String {
    format!("Error: Can't find summary data for {sheet} sheet")
}

/// Marker text for a sheet whose transcript pass failed.
pub fn transcript_error_marker(sheet: &str) -> String {
    format!("Error: Can't find chat data for {sheet} sheet")
}
