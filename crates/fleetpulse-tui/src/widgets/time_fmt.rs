//! Human-readable timestamp and age formatting helpers.

use chrono::{DateTime, Local, Utc};

/// Card "Last seen" value: local wall-clock `HH:MM:SS`, or `never`.
pub fn fmt_last_seen(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "never".into(),
        |dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string(),
    )
}

/// Header "Updated" value.
pub fn fmt_clock(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Compact age (e.g., "47d", "4h 23m", "12m", "30s"). Future times read as "now".
pub fn fmt_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    if secs <= 0 {
        return "now".into();
    }
    let secs = secs.unsigned_abs();
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{secs}s")
    }
}
