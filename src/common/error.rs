//! Unified error types for the chatbook library.
//!
//! Ingestion errors (container and XML problems) and analysis errors
//! (per-sheet report failures) share one enum so callers see a consistent
//! API. Analysis errors are caught per-sheet by the report layer and turned
//! into marker strings; nothing here aborts a whole workbook run.
use thiserror::Error;

/// Main error type for chatbook operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error occurred
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// File is not a recognized spreadsheet container
    #[error("Not a valid spreadsheet file")]
    NotSpreadsheet,

    /// Archive part not found
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// A required column is absent from a sheet
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Every `Token` value in the sheet is empty or missing
    #[error("No usable groups in the Token column")]
    EmptyGroups,

    /// No group yields a valid time span
    #[error("No group has parsable Date/Time values")]
    UnparsableTimestamps,

    /// A token value that is neither text nor a number
    #[error("Malformed token value: {0}")]
    MalformedToken(String),
}

/// Result type for chatbook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => {
                Error::ComponentNotFound("archive entry not found".to_string())
            },
            other => Error::ZipError(other.to_string()),
        }
    }
}
