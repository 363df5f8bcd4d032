//! Binary arithmetic by operator symbol
//!
//! Two evaluators share the [`Operator`] table:
//! - [`evaluate`] keeps the lenient behavior existing flows rely on: an unknown
//!   symbol yields `0` and division by zero yields `inf`/`NaN`.
//! - [`checked_evaluate`] reports both cases as errors.

use crate::error::{CalcError, Result};
use crate::rounding::round_to;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimals kept in an arithmetic result
pub const ARITHMETIC_DECIMALS: u32 = 4;

/// Supported binary operators, matched by exact symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    /// Raw result, no rounding
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
            Operator::Multiply => a * b,
            Operator::Divide => a / b,
        }
    }
}

impl FromStr for Operator {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            other => Err(CalcError::invalid_operator(other)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Apply `symbol` to `a` and `b`, rounded to four decimals
///
/// Unknown symbols return `0`; a zero divisor is not intercepted.
pub fn evaluate(symbol: &str, a: f64, b: f64) -> f64 {
    match symbol.parse::<Operator>() {
        Ok(op) => round_to(op.apply(a, b), ARITHMETIC_DECIMALS),
        Err(_) => 0.0,
    }
}

/// Like [`evaluate`] but rejects unknown symbols and zero divisors
pub fn checked_evaluate(symbol: &str, a: f64, b: f64) -> Result<f64> {
    let op: Operator = symbol.parse()?;
    if op == Operator::Divide && b == 0.0 {
        return Err(CalcError::DivisionByZero(a));
    }
    Ok(round_to(op.apply(a, b), ARITHMETIC_DECIMALS))
}
