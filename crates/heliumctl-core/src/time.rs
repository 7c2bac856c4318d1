use chrono::{DateTime, TimeZone, Utc};

/// Seconds between the Chromium epoch (1601-01-01) and the Unix epoch.
pub const CHROMIUM_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

pub const MICROS_PER_SEC: i64 = 1_000_000;

/// Convert a Chromium timestamp (microseconds since 1601-01-01) to UTC.
///
/// Bookmarks `date_added` and history `last_visit_time` both use this
/// representation. Out-of-range values fall back to the Unix epoch.
pub fn from_chromium_micros(micros: i64) -> DateTime<Utc> {
    let unix_micros = micros - CHROMIUM_EPOCH_OFFSET_SECS * MICROS_PER_SEC;
    Utc.timestamp_micros(unix_micros).single().unwrap_or_default()
}

/// Convert a UTC time back to a Chromium timestamp.
pub fn to_chromium_micros(time: DateTime<Utc>) -> i64 {
    time.timestamp_micros() + CHROMIUM_EPOCH_OFFSET_SECS * MICROS_PER_SEC
}

/// Human-readable age of a timestamp relative to `now`, for list output.
pub fn format_relative(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(time);
    let mins = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if mins < 1 {
        "just now".to_string()
    } else if mins < 60 {
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if hours < 24 {
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if days < 7 {
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        time.format("%Y-%m-%d").to_string()
    }
}
