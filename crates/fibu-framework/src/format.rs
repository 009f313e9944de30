//! Reply formatting helpers.

use time::Duration;

/// Renders a run time in seconds as `mm:ss.cc`.
///
/// Minutes are the total minute count (a 75 minute run reads `75:00.00`);
/// centiseconds are truncated.
pub fn format_run_time(seconds: f64) -> String {
    let millis = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let minutes = millis / 60_000;
    let secs = (millis / 1000) % 60;
    let centis = (millis % 1000) / 10;
    format!("{minutes:02}:{secs:02}.{centis:02}")
}

/// Renders an elapsed duration as relative time without a suffix.
///
/// Each unit is rounded independently and the first bucket that fits wins,
/// so 50 minutes reads "an hour" and 400 days reads "a year".
pub fn humanize_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_seconds_f64().max(0.0);
    let days = secs / 86_400.0;

    let seconds = secs.round();
    let minutes = (secs / 60.0).round();
    let hours = (secs / 3_600.0).round();
    let whole_days = days.round();
    let months = (days * 4_800.0 / 146_097.0).round();
    let years = (days * 400.0 / 146_097.0).round();

    if seconds < 45.0 {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{minutes} minutes")
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{hours} hours")
    } else if whole_days <= 1.0 {
        "a day".to_string()
    } else if whole_days < 26.0 {
        format!("{whole_days} days")
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < 11.0 {
        format!("{months} months")
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{years} years")
    }
}
