//! Elapsed-time helpers for the call display

use chrono::{DateTime, Utc};

/// Whole seconds between `start` and `now`, clamped at zero
#[must_use]
pub fn elapsed_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from(now.signed_duration_since(start).num_seconds()).unwrap_or(0)
}

/// Format elapsed seconds as `MM:SS`
///
/// Minutes are not wrapped into hours, so an hour-long call reads `60:00`.
#[must_use]
pub fn format_elapsed(seconds: u64) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    format!("{minutes:02}:{secs:02}")
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_format_elapsed_basic() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(5), "00:05");
        assert_eq!(format_elapsed(59), "00:59");
        assert_eq!(format_elapsed(60), "01:00");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(930), "15:30");
    }

    #[test]
    fn test_format_elapsed_does_not_wrap_hours() {
        assert_eq!(format_elapsed(3600), "60:00");
        assert_eq!(format_elapsed(6000 * 60 + 1), "6000:01");
    }

    #[test]
    fn test_elapsed_seconds_truncates_fraction() {
        let start = Utc::now();
        let now = start + Duration::milliseconds(5_999);
        assert_eq!(elapsed_seconds(start, now), 5);
    }

    #[test]
    fn test_elapsed_seconds_never_negative() {
        let start = Utc::now();
        let earlier = start - Duration::seconds(30);
        assert_eq!(elapsed_seconds(start, earlier), 0);
    }

    proptest! {
        #[test]
        fn prop_format_matches_minutes_and_seconds(t in 0u64..1_000_000) {
            let formatted = format_elapsed(t);
            let (minutes, seconds) = formatted.split_once(':').unwrap();

            prop_assert!(minutes.len() >= 2);
            prop_assert_eq!(seconds.len(), 2);
            prop_assert_eq!(minutes.parse::<u64>().unwrap(), t / 60);
            prop_assert_eq!(seconds.parse::<u64>().unwrap(), t % 60);
        }
    }
}
