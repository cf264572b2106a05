use humansize::{format_size as human_format_size, BINARY};

/// Format file size in human-readable format (B, KiB, MiB, GiB)
pub fn format_size(size: u64) -> String {
    human_format_size(size, BINARY)
}

/// Format a duration in seconds as `m:ss` or `h:mm:ss`
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "--:--".to_string();
    }

    let total = seconds.round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
