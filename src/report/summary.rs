//! Session summary: longest conversation and distinct-guest count.

use std::collections::HashMap;

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::common::{Error, Result, datetime};
use crate::sheet::{CellValue, SheetTable};

use super::token::{is_missing, normalize_token};
use super::{DATE_TIME_COLUMN, TOKEN_COLUMN};

/// Per-sheet session summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Token of the longest session
    pub max_duration_token: String,
    /// That session's span in whole minutes
    pub max_duration_minutes: i64,
    /// Number of distinct non-empty tokens
    pub num_unique_guests: usize,
}

/// One token's rows, folded to a time range.
struct Partition {
    token: String,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    /// A non-empty Date/Time value failed to coerce; the span is undefined
    unparsable: bool,
}

impl Partition {
    fn new(token: String) -> Self {
        Partition {
            token,
            start: None,
            end: None,
            unparsable: false,
        }
    }

    fn observe(&mut self, timestamp: NaiveDateTime) {
        self.start = Some(self.start.map_or(timestamp, |s| s.min(timestamp)));
        self.end = Some(self.end.map_or(timestamp, |e| e.max(timestamp)));
    }

    fn span(&self) -> Option<TimeDelta> {
        if self.unparsable {
            return None;
        }
        Some(self.end? - self.start?)
    }
}

/// Summarize one sheet's sessions.
///
/// Sessions are keyed by the distinct normalized tokens that appear in the
/// sheet; continuation rows (empty token) contribute their timestamps to the
/// most recent session above them, so a session's span covers its whole
/// conversation, not just the row that carries the token. Rows before the
/// first token belong to no session and are skipped. The longest span wins;
/// ties go to the token seen first in table order.
pub fn summarize(table: &SheetTable) -> Result<SessionSummary> {
    let token_col = table.require_column(TOKEN_COLUMN)?;
    let time_col = table.require_column(DATE_TIME_COLUMN)?;

    let mut partitions: Vec<Partition> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut current: Option<usize> = None;

    for row in table.rows() {
        let raw = &row[token_col];
        if !is_missing(raw) {
            let token = normalize_token(raw)?;
            let slot = *index.entry(token.clone()).or_insert_with(|| {
                partitions.push(Partition::new(token));
                partitions.len() - 1
            });
            current = Some(slot);
        }
        let Some(slot) = current else {
            continue;
        };
        let partition = &mut partitions[slot];

        match &row[time_col] {
            CellValue::Empty => {},
            CellValue::DateTime(dt) => partition.observe(*dt),
            CellValue::String(s) => match datetime::parse_datetime_string(s.trim()) {
                Some(dt) => partition.observe(dt),
                None => partition.unparsable = true,
            },
            CellValue::Int(i) => match datetime::from_excel_serial(*i as f64, false) {
                Some(dt) => partition.observe(dt),
                None => partition.unparsable = true,
            },
            CellValue::Float(f) => match datetime::from_excel_serial(*f, false) {
                Some(dt) => partition.observe(dt),
                None => partition.unparsable = true,
            },
            _ => partition.unparsable = true,
        }
    }

    if partitions.is_empty() {
        return Err(Error::EmptyGroups);
    }
    let num_unique_guests = partitions.len();

    let mut best: Option<(usize, TimeDelta)> = None;
    for (i, partition) in partitions.iter().enumerate() {
        let Some(span) = partition.span() else {
            continue;
        };
        // Strict comparison keeps the first-seen partition on ties
        if best.is_none_or(|(_, best_span)| span > best_span) {
            best = Some((i, span));
        }
    }
    let Some((winner, span)) = best else {
        return Err(Error::UnparsableTimestamps);
    };

    Ok(SessionSummary {
        max_duration_token: partitions[winner].token.clone(),
        max_duration_minutes: span.num_minutes(),
        num_unique_guests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(tokens: Vec<CellValue>, times: Vec<CellValue>) -> SheetTable {
        let rows = tokens
            .into_iter()
            .zip(times)
            .map(|(t, d)| vec![t, d])
            .collect();
        SheetTable::new(
            vec![TOKEN_COLUMN.to_string(), DATE_TIME_COLUMN.to_string()],
            rows,
        )
    }

    fn s(text: &str) -> CellValue {
        CellValue::String(text.to_string())
    }

    #[test]
    fn test_single_session_spans_continuation_rows() {
        let t = table(
            vec![CellValue::Int(1), CellValue::Empty, CellValue::Empty],
            vec![
                s("2024-01-01T10:00"),
                s("2024-01-01T10:05"),
                s("2024-01-01T10:30"),
            ],
        );
        let summary = summarize(&t).unwrap();
        assert_eq!(summary.max_duration_token, "1");
        assert_eq!(summary.max_duration_minutes, 30);
        assert_eq!(summary.num_unique_guests, 1);
    }

    #[test]
    fn test_rows_before_first_token_are_skipped() {
        let t = table(
            vec![CellValue::Empty, CellValue::Int(1), CellValue::Empty],
            vec![
                s("2024-01-01 08:00"),
                s("2024-01-01 10:00"),
                s("2024-01-01 10:10"),
            ],
        );
        let summary = summarize(&t).unwrap();
        assert_eq!(summary.max_duration_minutes, 10);
    }

    #[test]
    fn test_longest_session_wins() {
        let t = table(
            vec![
                CellValue::Int(1),
                CellValue::Int(2),
                CellValue::Int(1),
                CellValue::Int(2),
            ],
            vec![
                s("2024-01-01 10:00"),
                s("2024-01-01 11:00"),
                s("2024-01-01 10:30"),
                s("2024-01-01 12:15"),
            ],
        );
        let summary = summarize(&t).unwrap();
        assert_eq!(summary.max_duration_token, "2");
        assert_eq!(summary.max_duration_minutes, 75);
        assert_eq!(summary.num_unique_guests, 2);
    }

    #[test]
    fn test_tie_breaks_to_first_seen() {
        let t = table(
            vec![
                CellValue::Int(7),
                CellValue::Int(8),
                CellValue::Int(7),
                CellValue::Int(8),
            ],
            vec![
                s("2024-01-01 10:00"),
                s("2024-01-01 11:00"),
                s("2024-01-01 10:30"),
                s("2024-01-01 11:30"),
            ],
        );
        assert_eq!(summarize(&t).unwrap().max_duration_token, "7");
    }

    #[test]
    fn test_multi_day_span_counts_full_minutes() {
        let t = table(
            vec![CellValue::Int(1), CellValue::Int(1)],
            vec![s("2024-01-01 10:00"), s("2024-01-03 10:05")],
        );
        // 2 days and 5 minutes; the sub-day remainder alone would be 5
        assert_eq!(summarize(&t).unwrap().max_duration_minutes, 2885);
    }

    #[test]
    fn test_seconds_truncate() {
        let t = table(
            vec![CellValue::Int(1), CellValue::Int(1)],
            vec![s("2024-01-01 10:00:00"), s("2024-01-01 10:05:59")],
        );
        assert_eq!(summarize(&t).unwrap().max_duration_minutes, 5);
    }

    #[test]
    fn test_numeric_and_float_tokens_are_one_guest() {
        let t = table(
            vec![CellValue::Int(42), CellValue::Float(42.0)],
            vec![s("2024-01-01 10:00"), s("2024-01-01 10:10")],
        );
        let summary = summarize(&t).unwrap();
        assert_eq!(summary.num_unique_guests, 1);
        assert_eq!(summary.max_duration_minutes, 10);
    }

    #[test]
    fn test_serial_timestamps_accepted() {
        let t = table(
            vec![CellValue::Int(1), CellValue::Int(1)],
            // 2024-01-01 00:00 and 12:00 as raw serials
            vec![CellValue::Float(45292.0), CellValue::Float(45292.5)],
        );
        assert_eq!(summarize(&t).unwrap().max_duration_minutes, 720);
    }

    #[test]
    fn test_duplicate_rows_do_not_inflate_guest_count() {
        let t = table(
            vec![CellValue::Int(5), CellValue::Int(5), CellValue::Int(5)],
            vec![
                s("2024-01-01 10:00"),
                s("2024-01-01 10:00"),
                s("2024-01-01 10:20"),
            ],
        );
        let summary = summarize(&t).unwrap();
        assert_eq!(summary.num_unique_guests, 1);
        assert_eq!(summary.max_duration_minutes, 20);
    }

    #[test]
    fn test_unparsable_partition_excluded_from_max() {
        let t = table(
            vec![
                CellValue::Int(1),
                CellValue::Int(1),
                CellValue::Int(2),
                CellValue::Int(2),
            ],
            vec![
                s("2024-01-01 10:00"),
                s("garbage"),
                s("2024-01-01 10:00"),
                s("2024-01-01 10:05"),
            ],
        );
        let summary = summarize(&t).unwrap();
        // Token 1's partition is poisoned; token 2 wins despite the shorter
        // wall-clock footprint
        assert_eq!(summary.max_duration_token, "2");
        assert_eq!(summary.num_unique_guests, 2);
    }

    #[test]
    fn test_all_unparsable_fails() {
        let t = table(vec![CellValue::Int(1)], vec![s("garbage")]);
        assert!(matches!(summarize(&t), Err(Error::UnparsableTimestamps)));
    }

    #[test]
    fn test_empty_tokens_fail() {
        let t = table(
            vec![CellValue::Empty, s("")],
            vec![s("2024-01-01 10:00"), s("2024-01-01 10:05")],
        );
        assert!(matches!(summarize(&t), Err(Error::EmptyGroups)));
    }

    #[test]
    fn test_missing_columns_fail() {
        let t = SheetTable::new(vec!["Other".to_string()], vec![]);
        assert!(matches!(summarize(&t), Err(Error::MissingColumn(_))));
    }

    #[test]
    fn test_malformed_token_fails() {
        let t = table(vec![CellValue::Bool(true)], vec![s("2024-01-01 10:00")]);
        assert!(matches!(summarize(&t), Err(Error::MalformedToken(_))));
    }
}
