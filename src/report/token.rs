//! Group-token normalization.
//!
//! The `Token` column mixes genuine strings with numeric cells, and numeric
//! identifiers frequently arrive as floats (`42.0`). Every place a token is
//! used as a key or a label goes through [`normalize_token`] so one
//! underlying identifier never surfaces under two textual forms.

use crate::common::{Error, Result};
use crate::sheet::CellValue;

/// Check whether a token cell counts as missing for grouping purposes.
///
/// Both truly empty cells and empty-string cells are missing; whitespace is
/// preserved, not trimmed, to match what the sheet actually says.
pub fn is_missing(value: &CellValue) -> bool {
    match value {
        CellValue::Empty => true,
        CellValue::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Normalize a token cell to its canonical string identity.
///
/// Strings pass through unchanged (idempotent); integers and floats are
/// truncated to their decimal integer form, so `42`, `42.0`, and a float
/// serialization artifact all become `"42"`. Anything else cannot identify
/// a group and fails with `MalformedToken`.
pub fn normalize_token(value: &CellValue) -> Result<String> {
    match value {
        CellValue::String(s) => Ok(s.clone()),
        CellValue::Int(i) => Ok(itoa::Buffer::new().format(*i).to_string()),
        CellValue::Float(f) => {
            if !f.is_finite() || f.abs() >= 9.2e18 {
                return Err(Error::MalformedToken(f.to_string()));
            }
            Ok(itoa::Buffer::new().format(f.trunc() as i64).to_string())
        },
        other => Err(Error::MalformedToken(other.to_display_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_string_tokens_pass_through() {
        let value = CellValue::String("room-12".to_string());
        assert_eq!(normalize_token(&value).unwrap(), "room-12");
        // A numeric-looking string is already textual and stays as-is
        let value = CellValue::String("42.0".to_string());
        assert_eq!(normalize_token(&value).unwrap(), "42.0");
    }

    #[test]
    fn test_numeric_tokens_truncate() {
        assert_eq!(normalize_token(&CellValue::Int(42)).unwrap(), "42");
        assert_eq!(normalize_token(&CellValue::Float(42.0)).unwrap(), "42");
        assert_eq!(normalize_token(&CellValue::Float(42.7)).unwrap(), "42");
        assert_eq!(normalize_token(&CellValue::Float(-3.2)).unwrap(), "-3");
    }

    #[test]
    fn test_non_scalar_tokens_are_malformed() {
        assert!(matches!(
            normalize_token(&CellValue::Bool(true)),
            Err(Error::MalformedToken(_))
        ));
        assert!(matches!(
            normalize_token(&CellValue::Float(f64::NAN)),
            Err(Error::MalformedToken(_))
        ));
    }

    #[test]
    fn test_missing_detection() {
        assert!(is_missing(&CellValue::Empty));
        assert!(is_missing(&CellValue::String(String::new())));
        assert!(!is_missing(&CellValue::String(" ".to_string())));
        assert!(!is_missing(&CellValue::Int(0)));
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(s in ".*") {
            let once = normalize_token(&CellValue::String(s)).unwrap();
            let twice = normalize_token(&CellValue::String(once.clone())).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn int_and_float_forms_agree(n in -1_000_000i64..1_000_000) {
            let from_int = normalize_token(&CellValue::Int(n)).unwrap();
            let from_float = normalize_token(&CellValue::Float(n as f64)).unwrap();
            prop_assert_eq!(from_int, from_float);
        }
    }
}
