//! Shared infrastructure: error types, date/time coercion, and XML text
//! handling used by both the ingestion and reporting layers.

pub mod datetime;
pub mod error;
pub mod xml;

pub use error::{Error, Result};
