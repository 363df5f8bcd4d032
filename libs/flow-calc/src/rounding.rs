//! Decimal rounding
//!
//! Rounding happens on the decimal value the user sees, not on the binary
//! approximation: `12.345 - 10` is stored as `2.34499999...` but rounds to
//! `2.35`. The scaled value is reduced to 15 significant digits before it is
//! rounded half away from zero. Scaled values with more integer digits than
//! that are rounded as they are, and once every representable neighbour is at
//! least a quarter unit apart the input is returned untouched.

use crate::value::FlowValue;

/// Largest decimal count accepted, larger requests are clamped
pub const MAX_DECIMALS: u32 = 100;

const SIGNIFICANT_DIGITS: usize = 15;

/// Scaled magnitude from which the significant-digit correction would eat
/// integer digits
const CORRECTION_LIMIT: f64 = 1e15;

/// Scaled magnitude (2^50) from which there is nothing left to round
const EXACT_LIMIT: f64 = 1_125_899_906_842_624.0;

/// Round `value` to `decimals` places, half away from zero
///
/// Non-finite values pass through unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let factor = 10_f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= EXACT_LIMIT {
        return value;
    }

    let scaled = if scaled.abs() < CORRECTION_LIMIT {
        to_significant(scaled)
    } else {
        scaled
    };
    let rounded = scaled.round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Round a loosely typed number
///
/// Falsy input (`0`, `null`, `NaN`, `""`, `false`) yields `0`. Everything else
/// is converted to a number first, so `"3.14159"` rounds like `3.14159` and
/// `"abc"` gives `NaN`.
pub fn round_number(value: &FlowValue, decimals: u32) -> f64 {
    if !value.is_truthy() {
        return 0.0;
    }
    round_to(value.to_number(), decimals)
}

fn to_significant(value: f64) -> f64 {
    format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value)
        .parse()
        .unwrap_or(value)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
#[allow(clippy::approx_constant)]
mod tests {
    use super::*;

    #[test]
    fn test_round() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(3.145, 2), 3.15);
        assert_eq!(round_to(3.14159, 0), 3.0);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to(1.005, 2), 1.01);
        assert_eq!(round_to(-1.005, 2), -1.01);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(12.345 - 10.0, 2), 2.35);
    }

    #[test]
    fn test_round_non_finite_passthrough() {
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
        assert_eq!(round_to(1e300, 100), 1e300);
    }

    #[test]
    fn test_round_keeps_large_integers() {
        assert_eq!(round_to(1234567890123456.0, 0), 1234567890123456.0);
        assert_eq!(round_to(1234567890123456.0, 2), 1234567890123456.0);
        assert_eq!(round_to(999999999999999.0, 4), 999999999999999.0);
        assert_eq!(round_to(-9007199254740991.0, 0), -9007199254740991.0);
        assert_eq!(round_to(12345678901234.56, 1), 12345678901234.6);
    }

    #[test]
    fn test_round_negative_zero_normalized() {
        let r = round_to(-0.0001, 2);
        assert_eq!(r, 0.0);
        assert!(r.is_sign_positive());
    }

    #[test]
    fn test_round_number_falsy_is_zero() {
        assert_eq!(round_number(&FlowValue::Number(0.0), 2), 0.0);
        assert_eq!(round_number(&FlowValue::Null, 2), 0.0);
        assert_eq!(round_number(&FlowValue::Number(f64::NAN), 2), 0.0);
        assert_eq!(round_number(&FlowValue::from(""), 2), 0.0);
        assert_eq!(round_number(&FlowValue::Bool(false), 2), 0.0);
    }

    #[test]
    fn test_round_number_coerces_text() {
        assert_eq!(round_number(&FlowValue::from("3.14159"), 2), 3.14);
        assert_eq!(round_number(&FlowValue::from("0"), 2), 0.0);
        assert!(round_number(&FlowValue::from("abc"), 2).is_nan());
    }
}
