//! Property tests for the calculation helpers

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use chrono::{Duration, TimeZone, Utc};
use flow_calc::{
    calculate_duration, compare, elapsed_seconds, format_token, round_to, Catalog,
    DurationFormat, DurationOutput, DurationParts,
};
use proptest::prelude::*;

const FIVE_YEARS_MS: i64 = 5 * 366 * 86_400 * 1000;

proptest! {
    #[test]
    fn duration_is_order_independent(base in 0i64..2_000_000_000_000, offset in -FIVE_YEARS_MS..FIVE_YEARS_MS) {
        let a = Utc.timestamp_millis_opt(base).unwrap();
        let b = a + Duration::milliseconds(offset);
        let i18n = Catalog::default();

        prop_assert_eq!(elapsed_seconds(a, b), elapsed_seconds(b, a));
        prop_assert_eq!(
            calculate_duration(a, b, &i18n, DurationFormat::Text),
            calculate_duration(b, a, &i18n, DurationFormat::Text)
        );
    }

    #[test]
    fn decomposition_reconstitutes_total(total in 0u64..(10 * 366 * 86_400)) {
        let parts = DurationParts::from_seconds(total);
        prop_assert!(parts.hours < 24);
        prop_assert!(parts.minutes < 60);
        prop_assert!(parts.seconds < 60);
        prop_assert_eq!(parts.total_seconds(), total);
    }

    #[test]
    fn seconds_mode_is_floor_of_elapsed(offset_ms in 0i64..FIVE_YEARS_MS) {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::milliseconds(offset_ms);
        prop_assert_eq!(
            calculate_duration(start, end, &Catalog::default(), DurationFormat::Seconds),
            DurationOutput::Seconds((offset_ms / 1000) as u64)
        );
    }

    #[test]
    fn token_format_is_idempotent(title in ".*") {
        let once = format_token(&title);
        prop_assert_eq!(format_token(&once), once.clone());
        prop_assert!(!once.contains("--"));
        prop_assert!(once.chars().all(|c| c == '-' || c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn compare_with_itself_is_positive_zero(x in -1e12f64..1e12) {
        let delta = compare(x, x);
        prop_assert_eq!(delta, 0.0);
        prop_assert!(delta.is_sign_positive());
    }

    #[test]
    fn rounding_is_stable(x in -1e18f64..1e18, decimals in 0u32..6) {
        let once = round_to(x, decimals);
        prop_assert_eq!(round_to(once, decimals), once);
    }

    #[test]
    fn rounding_keeps_integers(n in -(1i64 << 53)..(1i64 << 53), decimals in 0u32..8) {
        let x = n as f64;
        prop_assert_eq!(round_to(x, decimals), x);
    }
}

#[test]
fn end_to_end_one_day_one_hour_one_minute_one_second() {
    let t0 = Utc.with_ymd_and_hms(2023, 6, 15, 21, 30, 0).unwrap();
    let t1 = t0 + Duration::seconds(90_061);
    let i18n = Catalog::for_language("en");

    assert_eq!(
        calculate_duration(t0, t1, &i18n, DurationFormat::Text),
        DurationOutput::Text("1 day 1 hour 1 minute".to_string())
    );
    assert_eq!(
        calculate_duration(t0, t1, &i18n, DurationFormat::Seconds),
        DurationOutput::Seconds(90_061)
    );
}
