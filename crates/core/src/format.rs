use crate::types::SearchMatch;

/// Format a seconds offset as `M:SS`, or `H:MM:SS` from one hour up.
///
/// Fractional seconds are truncated. Negative and non-finite input is the
/// caller's problem.
pub fn format_time(seconds: f64) -> String {
    let total = seconds as u64;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Render a match as a single line: `[1:05] before[matched]after`
pub fn format_match(m: &SearchMatch) -> String {
    format!(
        "[{}] {}[{}]{}",
        format_time(m.timestamp),
        m.context_before,
        m.matched_text,
        m.context_after
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(599.0), "9:59");
        assert_eq!(format_time(3599.0), "59:59");
    }

    #[test]
    fn switches_to_hours_at_one_hour() {
        assert_eq!(format_time(3600.0), "1:00:00");
        assert_eq!(format_time(3661.0), "1:01:01");
        assert_eq!(format_time(36_000.0), "10:00:00");
    }

    #[test]
    fn truncates_fractional_seconds() {
        assert_eq!(format_time(59.999), "0:59");
        assert_eq!(format_time(3660.9), "1:01:00");
    }

    #[test]
    fn match_line_brackets_the_hit() {
        let m = SearchMatch {
            text: "We're no strangers to love".to_string(),
            timestamp: 19.0,
            matched_text: "strangers".to_string(),
            context_before: "we're no ".to_string(),
            context_after: " to love".to_string(),
        };
        assert_eq!(format_match(&m), "[0:19] we're no [strangers] to love");
    }
}
