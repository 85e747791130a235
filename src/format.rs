//! Duration formatting for track lengths.
//!
//! All conversions truncate: milliseconds become whole seconds by integer
//! division and every component is taken modulo its range. The hour
//! component is dropped by the `m:ss` formats, so a track of one hour,
//! one minute and one second renders as `1:01`.

struct Components {
    hours: u64,
    minutes: u64,
    seconds: u64,
    millis: u64,
}

fn components(duration_millis: u64) -> Components {
    let total_seconds = duration_millis / 1000;
    Components {
        hours: (total_seconds / 3600) % 3600,
        minutes: (total_seconds / 60) % 60,
        seconds: total_seconds % 60,
        millis: duration_millis % 1000,
    }
}

/// Formats a duration in milliseconds as `m:ss`.
///
/// ```
/// use tunelist::format::format_minutes_seconds;
///
/// assert_eq!(format_minutes_seconds(65_000), "1:05");
/// assert_eq!(format_minutes_seconds(3_661_000), "1:01");
/// ```
pub fn format_minutes_seconds(duration_millis: u64) -> String {
    let c = components(duration_millis);
    format!("{}:{:02}", c.minutes, c.seconds)
}

/// Formats a duration in milliseconds as `m:ss.mmm`.
pub fn format_minutes_seconds_millis(duration_millis: u64) -> String {
    let c = components(duration_millis);
    format!("{}:{:02}.{:03}", c.minutes, c.seconds, c.millis)
}

/// Formats a duration in milliseconds as `h:mm:ss.mmm`.
pub fn format_hours_minutes_seconds_millis(duration_millis: u64) -> String {
    let c = components(duration_millis);
    format!("{}:{:02}:{:02}.{:03}", c.hours, c.minutes, c.seconds, c.millis)
}
