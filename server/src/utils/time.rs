//! Time utility functions

use chrono::NaiveDate;

/// Parse a calendar date in `YYYY-MM-DD` or compact `YYYYMMDD` form
pub fn parse_ymd(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let format = if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        "%Y%m%d"
    } else {
        "%Y-%m-%d"
    };
    NaiveDate::parse_from_str(raw, format).ok()
}
