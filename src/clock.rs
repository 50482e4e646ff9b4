//! Clock-time arithmetic
//!
//! Sleep onset and wake times are wall-clock strings (`HH:MM`) with no date
//! attached. A session that crosses midnight is recognised purely by the wake
//! time not being after the onset time.

use crate::error::ValidationError;
use chrono::{NaiveTime, Timelike};

/// Minutes in one day, added to the wake time when a session crosses midnight
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse a canonical `HH:MM` clock string into minutes since midnight.
///
/// Exactly two digits on each side of the colon, hours 0-23 and minutes
/// 0-59, no surrounding whitespace. This is the only form records store.
pub fn parse_clock(time: &str) -> Result<u32, ValidationError> {
    let bytes = time.as_bytes();
    let canonical = bytes.len() == 5
        && bytes[2] == b':'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
    if !canonical {
        return Err(ValidationError::InvalidClock(time.to_string()));
    }
    clock_minutes(time).ok_or_else(|| ValidationError::InvalidClock(time.to_string()))
}

/// Lenient parse: trims and accepts single-digit fields such as `7:5`
pub(crate) fn clock_minutes(time: &str) -> Option<u32> {
    let trimmed = time.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .ok()
        .map(|t| t.hour() * 60 + t.minute())
}

/// Rewrite a clock string in canonical `HH:MM` form.
///
/// Empty input stays empty; input that does not parse is returned trimmed so
/// validation can report it.
pub fn normalize_clock(time: &str) -> String {
    match clock_minutes(time) {
        Some(minutes) => format_clock(minutes),
        None => time.trim().to_string(),
    }
}

/// Convert a clock string to minutes since midnight.
///
/// An empty value means "not recorded" and yields 0. Malformed strings are
/// outside the contract; they are treated like an empty value.
pub fn time_to_minutes(time: &str) -> u32 {
    clock_minutes(time).unwrap_or(0)
}

/// Sleep duration in minutes between onset `start` and wake `end`.
///
/// Returns 0 when either side is missing. When `end <= start` the session is
/// assumed to have crossed midnight and a full day is added to `end`, so the
/// result is always in `1..=1440` for two recorded times.
pub fn calculate_duration(start: &str, end: &str) -> u32 {
    let (Some(start), Some(end)) = (clock_minutes(start), clock_minutes(end)) else {
        return 0;
    };

    let end = if end <= start { end + MINUTES_PER_DAY } else { end };
    end - start
}

/// Format an offset in minutes as a `HH:MM` clock reading (wrapping at 24h)
pub fn format_clock(minutes: u32) -> String {
    let mins = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", mins / 60, mins % 60)
}

/// Format a duration as `"{h}h {m}m"`, e.g. `"7h 30m"`
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_to_minutes() {
        assert_eq!(time_to_minutes(""), 0);
        assert_eq!(time_to_minutes("00:00"), 0);
        assert_eq!(time_to_minutes("06:30"), 390);
        assert_eq!(time_to_minutes("23:59"), 1439);
        assert_eq!(time_to_minutes("7:05"), 425);
    }

    #[test]
    fn test_parse_clock_rejects_out_of_range() {
        assert!(parse_clock("24:00").is_err());
        assert!(parse_clock("12:60").is_err());
        assert!(parse_clock("noon").is_err());
        assert!(parse_clock("").is_err());
        assert_eq!(parse_clock("22:15"), Ok(1335));
    }

    #[test]
    fn test_parse_clock_requires_canonical_form() {
        assert!(parse_clock("7:5").is_err());
        assert!(parse_clock("7:05").is_err());
        assert!(parse_clock(" 22:15 ").is_err());
        assert!(parse_clock("22:15:00").is_err());
        assert!(parse_clock("+1:05").is_err());
        assert_eq!(parse_clock("07:05"), Ok(425));
    }

    #[test]
    fn test_normalize_clock() {
        assert_eq!(normalize_clock("7:5"), "07:05");
        assert_eq!(normalize_clock(" 22:15 "), "22:15");
        assert_eq!(normalize_clock(""), "");
        assert_eq!(normalize_clock(" noon "), "noon");
    }

    #[test]
    fn test_duration_is_repeatable() {
        for (start, end) in [("23:30", "06:30"), ("", "07:00"), ("07:00", "07:00")] {
            let first = calculate_duration(start, end);
            for _ in 0..3 {
                assert_eq!(calculate_duration(start, end), first);
            }
        }
        assert_eq!(time_to_minutes("06:30"), time_to_minutes("06:30"));
    }

    #[test]
    fn test_duration_same_day() {
        assert_eq!(calculate_duration("13:00", "14:30"), 90);
        assert_eq!(calculate_duration("00:30", "07:45"), 435);
    }

    #[test]
    fn test_duration_crosses_midnight() {
        assert_eq!(calculate_duration("23:30", "06:30"), 420);
        assert_eq!(calculate_duration("22:00", "00:00"), 120);

        let start = time_to_minutes("23:10");
        let end = time_to_minutes("05:20");
        assert_eq!(
            calculate_duration("23:10", "05:20"),
            (end + MINUTES_PER_DAY) - start
        );
    }

    #[test]
    fn test_duration_equal_times_is_full_day() {
        assert_eq!(calculate_duration("07:00", "07:00"), MINUTES_PER_DAY);
    }

    #[test]
    fn test_duration_missing_side() {
        assert_eq!(calculate_duration("", "07:00"), 0);
        assert_eq!(calculate_duration("23:00", ""), 0);
        assert_eq!(calculate_duration("", ""), 0);
    }

    #[test]
    fn test_duration_never_negative() {
        for start in (0..MINUTES_PER_DAY).step_by(37) {
            for end in (0..MINUTES_PER_DAY).step_by(41) {
                let d = calculate_duration(&format_clock(start), &format_clock(end));
                assert!(d > 0 && d <= MINUTES_PER_DAY, "{start} -> {end} gave {d}");
            }
        }
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_clock(1830), "06:30");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_duration(420), "7h 0m");
        assert_eq!(format_duration(455), "7h 35m");
    }
}
