//! RFC 3339 timestamp helpers.
//!
//! Dates are stored as strings so that records written by older replicas
//! (which may leave a date empty) still load. An empty string means "unset".

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, TimeZone, Utc};

/// Format a timestamp the way records store it (second precision, `Z` suffix).
pub fn format(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The current time, formatted for storage.
pub fn now() -> String {
    format(Utc::now())
}

/// Parse a stored timestamp. Empty or malformed values yield `None`.
pub fn parse(value: &str) -> Option<DateTime<FixedOffset>> {
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value).ok()
}

/// Parse user input as either RFC 3339 or a bare `YYYY-MM-DD` date
/// (midnight UTC), returning the storage form.
pub fn parse_user_date(value: &str) -> Option<String> {
    if let Some(parsed) = parse(value) {
        return Some(format(parsed.with_timezone(&Utc)));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(format(Utc.from_utc_datetime(&midnight)))
}
