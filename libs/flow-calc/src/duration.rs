//! Elapsed-time calculation
//!
//! Converts a start/end instant pair into either a localized description
//! (`"1 day 1 hour 1 minute"`) or the raw number of elapsed whole seconds.
//!
//! Conventions:
//! - Instants are millisecond-resolution; the difference is truncated to whole
//!   seconds after taking its absolute value, so argument order never matters.
//! - Seconds only appear in the description when days, hours and minutes are
//!   all zero. A zero span is described as `"0 seconds"`.

use crate::locale::Localizer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;

/// Output mode of [`calculate_duration`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationFormat {
    /// Localized human-readable text
    #[default]
    Text,
    /// Total elapsed whole seconds
    Seconds,
}

/// Result of [`calculate_duration`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DurationOutput {
    Text(String),
    Seconds(u64),
}

/// Elapsed seconds decomposed into calendar-free units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationParts {
    pub days: u64,
    /// 0..=23
    pub hours: u64,
    /// 0..=59
    pub minutes: u64,
    /// 0..=59
    pub seconds: u64,
}

impl DurationParts {
    /// Decompose a total using floor division at every step
    pub fn from_seconds(total: u64) -> Self {
        Self {
            days: total / SECONDS_PER_DAY,
            hours: (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
            minutes: (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
            seconds: total % SECONDS_PER_MINUTE,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.seconds
            + SECONDS_PER_MINUTE * self.minutes
            + SECONDS_PER_HOUR * self.hours
            + SECONDS_PER_DAY * self.days
    }

    /// Localized description, e.g. `"2 days 3 minutes"`
    pub fn describe<L: Localizer + ?Sized>(&self, i18n: &L) -> String {
        let units = [
            (self.days, "day", "days"),
            (self.hours, "hour", "hours"),
            (self.minutes, "minute", "minutes"),
        ];

        let parts: Vec<String> = units
            .iter()
            .filter_map(|&(value, singular, plural)| unit_phrase(value, singular, plural, i18n))
            .collect();

        if parts.is_empty() {
            return unit_phrase(self.seconds, "second", "seconds", i18n)
                .unwrap_or_else(|| format!("0 {}", i18n.translate("helpers.seconds")));
        }

        parts.join(" ")
    }
}

/// `"<value> <word>"`, singular for 1, omitted for 0
fn unit_phrase<L: Localizer + ?Sized>(
    value: u64,
    singular: &str,
    plural: &str,
    i18n: &L,
) -> Option<String> {
    match value {
        0 => None,
        1 => Some(format!("1 {}", i18n.translate(&format!("helpers.{}", singular)))),
        n => Some(format!("{} {}", n, i18n.translate(&format!("helpers.{}", plural)))),
    }
}

/// Whole seconds between two instants, order-independent
pub fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    let millis = (end - start).num_milliseconds().unsigned_abs();
    millis / 1000
}

/// Elapsed time between `start` and `end` in the requested format
pub fn calculate_duration<L: Localizer + ?Sized>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    i18n: &L,
    format: DurationFormat,
) -> DurationOutput {
    let diff_seconds = elapsed_seconds(start, end);
    let parts = DurationParts::from_seconds(diff_seconds);

    debug!(
        diff_seconds,
        days = parts.days,
        hours = parts.hours,
        minutes = parts.minutes,
        seconds = parts.seconds,
        "calculate_duration"
    );

    match format {
        DurationFormat::Seconds => DurationOutput::Seconds(diff_seconds),
        DurationFormat::Text => DurationOutput::Text(parts.describe(i18n)),
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::locale::Catalog;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn text(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        match calculate_duration(start, end, &Catalog::default(), DurationFormat::Text) {
            DurationOutput::Text(s) => s,
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_decomposition() {
        let parts = DurationParts::from_seconds(90_061);
        assert_eq!(
            parts,
            DurationParts {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1
            }
        );
        assert_eq!(parts.total_seconds(), 90_061);
    }

    #[test]
    fn test_full_description_omits_seconds() {
        let end = t0() + Duration::seconds(90_061);
        assert_eq!(text(t0(), end), "1 day 1 hour 1 minute");
    }

    #[test]
    fn test_numeric_mode() {
        let end = t0() + Duration::seconds(90_061);
        assert_eq!(
            calculate_duration(t0(), end, &Catalog::default(), DurationFormat::Seconds),
            DurationOutput::Seconds(90_061)
        );
    }

    #[test]
    fn test_plural_and_zero_units() {
        let end = t0() + Duration::days(1) + Duration::minutes(1);
        let s = text(t0(), end);
        assert_eq!(s, "1 day 1 minute");
        assert!(!s.contains("hour"));

        let end = t0() + Duration::days(3) + Duration::hours(2) + Duration::seconds(59);
        assert_eq!(text(t0(), end), "3 days 2 hours");
    }

    #[test]
    fn test_seconds_only_when_below_a_minute() {
        assert_eq!(text(t0(), t0() + Duration::seconds(42)), "42 seconds");
        assert_eq!(text(t0(), t0() + Duration::seconds(1)), "1 second");
        assert_eq!(text(t0(), t0()), "0 seconds");
    }

    #[test]
    fn test_sub_second_truncation() {
        let end = t0() + Duration::milliseconds(61_999);
        assert_eq!(elapsed_seconds(t0(), end), 61);
        assert_eq!(text(t0(), end), "1 minute");
    }

    #[test]
    fn test_order_independent() {
        let end = t0() + Duration::seconds(7_322);
        assert_eq!(elapsed_seconds(t0(), end), elapsed_seconds(end, t0()));
        assert_eq!(text(end, t0()), "2 hours 2 minutes");
    }

    #[test]
    fn test_localized_units() {
        let nl = Catalog::for_language("nl");
        let end = t0() + Duration::days(2) + Duration::minutes(1);
        assert_eq!(
            calculate_duration(t0(), end, &nl, DurationFormat::Text),
            DurationOutput::Text("2 dagen 1 minuut".to_string())
        );
    }
}
