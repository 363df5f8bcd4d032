//! Flow variable engine error types

use flow_calc::CalcError;
use thiserror::Error;

/// Result type for flow variable operations
pub type Result<T> = std::result::Result<T, FlowError>;

/// Flow variable engine errors
#[derive(Debug, Error)]
pub enum FlowError {
    /// An end action ran without a matching start
    #[error("No {kind} start found for {variable}")]
    MissingState {
        variable: String,
        kind: &'static str,
    },

    /// Variable name rejected
    #[error("Invalid variable name: {0}")]
    InvalidVariable(String),

    /// Variable already exists
    #[error("Variable already exists: {0}")]
    DuplicateVariable(String),

    /// Input could not be read as a number
    #[error("Not a number: {0}")]
    InvalidNumber(String),

    /// Result cannot be stored as a token value
    #[error("Result is not a finite number: {0}")]
    NonFiniteResult(f64),

    /// Token already registered with another type
    #[error("Token {id} is registered as {registered}, got {requested}")]
    TokenKindMismatch {
        id: String,
        registered: String,
        requested: String,
    },

    /// Calculation error
    #[error(transparent)]
    Calc(#[from] CalcError),

    /// Settings migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Settings store error
    #[error("Store error: {0}")]
    Store(String),

    /// Token sink error
    #[error("Token error: {0}")]
    Token(String),

    /// Trigger sink error
    #[error("Trigger error: {0}")]
    Trigger(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FlowError {
    pub fn missing_state(variable: impl Into<String>, kind: &'static str) -> Self {
        Self::MissingState {
            variable: variable.into(),
            kind,
        }
    }

    pub fn migration(msg: impl Into<String>) -> Self {
        Self::Migration(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::Serialization(err.to_string())
    }
}
