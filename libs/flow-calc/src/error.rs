//! Error types for flow-calc

use thiserror::Error;

/// Calculation errors
///
/// Only malformed input is reported here. Degenerate arithmetic in the
/// compatible evaluators yields `0`, `inf` or `NaN` instead of an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    #[error("Invalid instant: {0}")]
    InvalidInstant(String),

    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("Division by zero: {0} / 0")]
    DivisionByZero(f64),

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Amount is not a finite number: {0}")]
    NonFiniteAmount(f64),

    #[error("Locale error: {0}")]
    Locale(String),
}

impl CalcError {
    pub fn invalid_instant(msg: impl Into<String>) -> Self {
        Self::InvalidInstant(msg.into())
    }

    pub fn invalid_operator(symbol: impl Into<String>) -> Self {
        Self::InvalidOperator(symbol.into())
    }

    pub fn invalid_currency(code: impl Into<String>) -> Self {
        Self::InvalidCurrency(code.into())
    }

    pub fn locale(msg: impl Into<String>) -> Self {
        Self::Locale(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
