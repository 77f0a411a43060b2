use chrono::{DateTime, Datelike, Timelike, Utc};

/// Render an instant for the activity feed: `1st April 2021 - 9:30 PM UTC`.
///
/// Pure and idempotent. The caller passes an instant already in UTC; no
/// conversion happens here, the `UTC` suffix is a fixed literal. Day and
/// hour carry no leading zero while minutes are always two digits. Month
/// names are English regardless of locale.
pub fn format_feed_timestamp(ts: DateTime<Utc>) -> String {
    let day = ts.day();
    let (is_pm, hour) = ts.hour12();
    let meridiem = if is_pm { "PM" } else { "AM" };
    format!(
        "{day}{} {} {} - {hour}:{:02} {meridiem} UTC",
        ordinal_suffix(day),
        ts.format("%B"),
        ts.year(),
        ts.minute(),
    )
}

/// English ordinal suffix: 11/12/13 take `th`, otherwise the last digit
/// decides (1 → st, 2 → nd, 3 → rd, everything else → th).
fn ordinal_suffix(day: u32) -> &'static str {
    match day % 100 {
        11 | 12 | 13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}
