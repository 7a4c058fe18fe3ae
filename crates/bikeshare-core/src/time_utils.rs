use chrono::NaiveDateTime;

/// Formats accepted for source timestamps, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a source-local timestamp such as `"2017-01-01 00:07:57"`.
///
/// No timezone conversion is applied; the wall-clock value is kept as
/// written. Returns `None` for empty strings or unrecognised formats.
pub fn parse_local_timestamp(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

/// Render an hour of the day in 24-hour clock form, e.g. `17` → `"17:00"`.
pub fn format_hour(hour: u32) -> String {
    format!("{:02}:00", hour)
}
