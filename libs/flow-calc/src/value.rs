//! Loosely typed flow-card arguments
//!
//! Flow cards hand over whatever the user typed or dropped in as a token:
//! numbers, numeric strings, booleans or nothing at all. `FlowValue` keeps that
//! shape and provides the two coercions the calculators rely on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A flow-card argument as received from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FlowValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FlowValue {
    /// Host truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            FlowValue::Null => false,
            FlowValue::Bool(b) => *b,
            FlowValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FlowValue::Text(s) => !s.is_empty(),
        }
    }

    /// Whole-value numeric conversion
    ///
    /// Blank text converts to `0`, text that is not entirely a number to `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            FlowValue::Null => 0.0,
            FlowValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            },
            FlowValue::Number(n) => *n,
            FlowValue::Text(s) => text_to_number(s),
        }
    }

    /// Leading-prefix numeric conversion
    ///
    /// `"12.5 kWh"` parses as `12.5`; anything without a numeric prefix is `NaN`.
    pub fn parse_float(&self) -> f64 {
        match self {
            FlowValue::Number(n) => *n,
            FlowValue::Text(s) => parse_float(s),
            FlowValue::Null | FlowValue::Bool(_) => f64::NAN,
        }
    }
}

impl From<f64> for FlowValue {
    fn from(value: f64) -> Self {
        FlowValue::Number(value)
    }
}

impl From<i64> for FlowValue {
    fn from(value: i64) -> Self {
        FlowValue::Number(value as f64)
    }
}

impl From<bool> for FlowValue {
    fn from(value: bool) -> Self {
        FlowValue::Bool(value)
    }
}

impl From<&str> for FlowValue {
    fn from(value: &str) -> Self {
        FlowValue::Text(value.to_string())
    }
}

impl From<String> for FlowValue {
    fn from(value: String) -> Self {
        FlowValue::Text(value)
    }
}

impl<T: Into<FlowValue>> From<Option<T>> for FlowValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FlowValue::Null)
    }
}

impl fmt::Display for FlowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowValue::Null => write!(f, "null"),
            FlowValue::Bool(b) => write!(f, "{}", b),
            FlowValue::Number(n) => write!(f, "{}", format_number(*n)),
            FlowValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Render a number the way the host prints it (`5`, `3.5`, `Infinity`, `NaN`)
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Parse the longest numeric prefix of `input`
pub fn parse_float(input: &str) -> f64 {
    let trimmed = input.trim_start();
    match numeric_prefix_len(trimmed) {
        Some(len) => parse_literal(&trimmed[..len]),
        None => f64::NAN,
    }
}

fn text_to_number(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    if let Some(value) = parse_radix_literal(trimmed) {
        return value;
    }

    match numeric_prefix_len(trimmed) {
        Some(len) if len == trimmed.len() => parse_literal(trimmed),
        _ => f64::NAN,
    }
}

fn parse_literal(literal: &str) -> f64 {
    let unsigned = literal.trim_start_matches(['+', '-']);
    if unsigned == "Infinity" {
        return if literal.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    literal.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix_literal(input: &str) -> Option<f64> {
    let (radix, digits) = match input.get(..2) {
        Some("0x") | Some("0X") => (16, &input[2..]),
        Some("0o") | Some("0O") => (8, &input[2..]),
        Some("0b") | Some("0B") => (2, &input[2..]),
        _ => return None,
    };
    Some(
        u64::from_str_radix(digits, radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN),
    )
}

/// Length in bytes of the decimal literal at the start of `input`, if any
fn numeric_prefix_len(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        pos += 1;
    }

    if input[pos..].starts_with("Infinity") {
        return Some(pos + "Infinity".len());
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let mut digits = pos - int_start;

    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - frac_start;
        if digits + frac_digits > 0 {
            digits += frac_digits;
            pos = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp = pos + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        let exp_digits_start = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits_start {
            pos = exp;
        }
    }

    Some(pos)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!FlowValue::Null.is_truthy());
        assert!(!FlowValue::Number(0.0).is_truthy());
        assert!(!FlowValue::Number(f64::NAN).is_truthy());
        assert!(!FlowValue::from("").is_truthy());
        assert!(!FlowValue::Bool(false).is_truthy());
        assert!(FlowValue::from("0").is_truthy());
        assert!(FlowValue::Number(-1.0).is_truthy());
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float("12.5 kWh"), 12.5);
        assert_eq!(parse_float("  -3"), -3.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("1e3x"), 1000.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float("abc").is_nan());
        assert!(parse_float("").is_nan());
        assert!(parse_float("inf").is_nan());
    }

    #[test]
    fn test_to_number_whole_value() {
        assert_eq!(FlowValue::from(" 42 ").to_number(), 42.0);
        assert_eq!(FlowValue::from("").to_number(), 0.0);
        assert_eq!(FlowValue::from("0x1F").to_number(), 31.0);
        assert_eq!(FlowValue::Bool(true).to_number(), 1.0);
        assert_eq!(FlowValue::Null.to_number(), 0.0);
        assert!(FlowValue::from("12px").to_number().is_nan());
        assert!(FlowValue::from("nan").to_number().is_nan());
    }

    #[test]
    fn test_untagged_deserialize() {
        let values: Vec<FlowValue> = serde_json::from_str(r#"[null, true, 3.5, "3.5"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                FlowValue::Null,
                FlowValue::Bool(true),
                FlowValue::Number(3.5),
                FlowValue::from("3.5"),
            ]
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }
}
