//! Baseline comparison
//!
//! `compare(baseline, current)` is the signed change since the baseline was
//! recorded, rounded to two decimals.

use crate::rounding::round_to;
use crate::value::FlowValue;

/// Decimals kept in a comparison delta
pub const COMPARISON_DECIMALS: u32 = 2;

/// Signed delta `current - baseline`, rounded to two decimals
///
/// A delta that rounds to zero is returned as positive `0.0`, never `-0.0`.
/// Unparseable operands yield `NaN`.
pub fn compare(baseline: f64, current: f64) -> f64 {
    let delta = round_to(current - baseline, COMPARISON_DECIMALS);
    if delta == 0.0 {
        0.0
    } else {
        delta
    }
}

/// [`compare`] on loosely typed operands, parsed by numeric prefix
pub fn compare_values(baseline: &FlowValue, current: &FlowValue) -> f64 {
    compare(baseline.parse_float(), current.parse_float())
}
