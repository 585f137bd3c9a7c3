//! Display formatting helpers

/// Format milliseconds as `MM:SS`, or `HH:MM:SS` from one hour up
pub fn format_time(ms: u64) -> String {
    let seconds = ms / 1000;
    let (hours, remainder) = (seconds / 3600, seconds % 3600);
    let (minutes, seconds) = (remainder / 60, remainder % 60);

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
