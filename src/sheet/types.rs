//! Common types for worksheet tables.

use chrono::NaiveDateTime;

/// Types of data that can be stored in a cell.
///
/// `DateTime` carries a decoded timestamp: ingestion resolves Excel serial
/// numbers once, against the workbook's date system, so nothing downstream
/// re-derives dates.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell
    Empty,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// String value
    String(String),
    /// Date/time value
    DateTime(NaiveDateTime),
    /// Error value
    Error(String),
}

impl CellValue {
    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Render the value the way it would display in a sheet cell.
    ///
    /// Empty cells render as the empty string, never as a missing-value
    /// marker. Integral floats drop their fractional artifact (`42.0` prints
    /// as `42`).
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Int(i) => itoa::Buffer::new().format(*i).to_string(),
            CellValue::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.2e18 {
                    itoa::Buffer::new().format(f.trunc() as i64).to_string()
                } else {
                    ryu::Buffer::new().format(*f).to_string()
                }
            },
            CellValue::String(s) => s.clone(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_display_numbers() {
        assert_eq!(CellValue::Int(42).to_display_string(), "42");
        assert_eq!(CellValue::Float(42.0).to_display_string(), "42");
        assert_eq!(CellValue::Float(-3.0).to_display_string(), "-3");
        assert_eq!(CellValue::Float(2.5).to_display_string(), "2.5");
    }

    #[test]
    fn test_display_empty_and_text() {
        assert_eq!(CellValue::Empty.to_display_string(), "");
        assert_eq!(
            CellValue::String("hello".to_string()).to_display_string(),
            "hello"
        );
        assert_eq!(CellValue::Bool(true).to_display_string(), "TRUE");
    }

    #[test]
    fn test_display_datetime() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(
            CellValue::DateTime(dt).to_display_string(),
            "2024-01-01 10:30:00"
        );
    }
}
