//! Human "time ago" strings for response shaping.

use chrono::{DateTime, Utc};

/// Formats how long ago `from` was, relative to `now`. Future or
/// identical timestamps read as "just now".
pub fn time_ago(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - from).num_seconds().max(0);

    if seconds < 45 {
        return "just now".to_string();
    }
    if seconds < 90 {
        return "a minute ago".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 45 {
        return format!("{minutes} minutes ago");
    }
    if minutes < 90 {
        return "an hour ago".to_string();
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hours ago");
    }

    let days = hours / 24;
    if days == 1 {
        return "yesterday".to_string();
    }
    if days < 30 {
        return format!("{days} days ago");
    }

    let months = days / 30;
    if months == 1 {
        return "a month ago".to_string();
    }
    if months < 12 {
        return format!("{months} months ago");
    }

    let years = days / 365;
    if years <= 1 {
        return "a year ago".to_string();
    }
    format!("{years} years ago")
}
