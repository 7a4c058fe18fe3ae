/// Two-decimal rendering of a non-negative quantity, with the whole part
/// grouped in thousands.
///
/// ```
/// use bikeshare_core::formatting::format_decimal;
///
/// assert_eq!(format_decimal(150.0), "150.00");
/// assert_eq!(format_decimal(1234567.891), "1,234,567.89");
/// ```
pub fn format_decimal(value: f64) -> String {
    let fixed = format!("{:.2}", value.max(0.0));
    match fixed.split_once('.') {
        Some((whole, frac)) => format!("{}.{}", group_thousands(whole), frac),
        None => group_thousands(&fixed),
    }
}

/// Format an integer count with thousands separators.
///
/// ```
/// use bikeshare_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u128) -> String {
    group_thousands(&value.to_string())
}

/// Format a number of seconds as a compact human-readable duration.
///
/// Zero-valued leading units are dropped; seconds are always shown.
///
/// # Examples
///
/// ```
/// use bikeshare_core::formatting::format_duration;
///
/// assert_eq!(format_duration(45.0), "45s");
/// assert_eq!(format_duration(600.0), "10m 0s");
/// assert_eq!(format_duration(3725.0), "1h 2m 5s");
/// assert_eq!(format_duration(90061.0), "1d 1h 1m 1s");
/// ```
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, secs)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Insert `,` between every group of three digits in an unsigned integer
/// string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    if len <= 3 {
        return digits.to_string();
    }
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
