//! Date/time coercion shared by worksheet ingestion and the summary pass.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Convert an Excel serial date to a datetime.
///
/// Serial dates count days from the epoch base, with the time of day in the
/// fractional part. Workbooks authored on classic Mac Excel use the 1904
/// epoch, signalled by `workbookPr date1904` in the manifest.
pub fn from_excel_serial(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }

    let base_date = if is_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    let days = serial.trunc() as i64;
    let seconds = ((serial.fract() * 86400.0).round() as i64) * 1_000_000; // microseconds

    let date = base_date.checked_add_signed(Duration::try_days(days)?)?;
    let time = Duration::microseconds(seconds);

    date.and_time(NaiveTime::from_hms_opt(0, 0, 0)?)
        .checked_add_signed(time)
}

/// Parse a datetime from the textual forms chat-log exports carry.
pub fn parse_datetime_string(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    // Date-only values are midnight timestamps.
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}
