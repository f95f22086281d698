//! Header-addressed table for one worksheet.

use super::types::CellValue;
use crate::common::{Error, Result};

/// One worksheet's data: a header of column names over row-major cells.
///
/// Rows are padded (or truncated) to header width at construction, so column
/// access by index is always in bounds. Column names are matched case- and
/// spelling-exact; a missing required column is a per-sheet failure, not a
/// crash for the whole workbook.
#[derive(Debug, Clone, Default)]
pub struct SheetTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    /// Create a table from a header and data rows.
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        SheetTable { columns, rows }
    }

    /// Get the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the data rows (header excluded).
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Get the number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find a column's index by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Resolve a required column, failing with `MissingColumn` if absent.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Iterate one column's values in row order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Get a cell by data-row and column index.
    pub fn value(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}
