//! Token identifiers and token triples
//!
//! A token is a named, typed value published to the automation host. The
//! calculators only produce the `(id, title, kind, value)` description; the
//! registry that owns the actual host tokens lives in the integration layer.

use crate::value::format_number;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

static NON_ALNUM_RUN: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)] // Static pattern
fn non_alnum_run() -> &'static Regex {
    NON_ALNUM_RUN.get_or_init(|| Regex::new(r"[^0-9A-Za-z]+").expect("valid token pattern"))
}

/// Normalize a display title into a token identifier
///
/// Every run of characters outside `[0-9A-Za-z]` becomes a single `-` and the
/// result is lower-cased. Idempotent.
pub fn format_token(title: &str) -> String {
    non_alnum_run().replace_all(title, "-").to_lowercase()
}

/// Value type of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    String,
    Number,
    Boolean,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token value, its variant decides the [`TokenKind`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl TokenValue {
    pub fn kind(&self) -> TokenKind {
        match self {
            TokenValue::Boolean(_) => TokenKind::Boolean,
            TokenValue::Number(_) => TokenKind::Number,
            TokenValue::String(_) => TokenKind::String,
        }
    }

    /// Empty value used when a token is registered before it has a result
    pub fn empty(kind: TokenKind) -> Self {
        match kind {
            TokenKind::String => TokenValue::String(String::new()),
            TokenKind::Number => TokenValue::Number(0.0),
            TokenKind::Boolean => TokenValue::Boolean(false),
        }
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Boolean(b) => write!(f, "{}", b),
            TokenValue::Number(n) => f.write_str(&format_number(*n)),
            TokenValue::String(s) => f.write_str(s),
        }
    }
}

impl From<f64> for TokenValue {
    fn from(value: f64) -> Self {
        TokenValue::Number(value)
    }
}

impl From<u64> for TokenValue {
    fn from(value: u64) -> Self {
        TokenValue::Number(value as f64)
    }
}

impl From<bool> for TokenValue {
    fn from(value: bool) -> Self {
        TokenValue::Boolean(value)
    }
}

impl From<String> for TokenValue {
    fn from(value: String) -> Self {
        TokenValue::String(value)
    }
}

impl From<&str> for TokenValue {
    fn from(value: &str) -> Self {
        TokenValue::String(value.to_string())
    }
}

/// Description of a token to publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSpec {
    /// Identifier, formatted from the title unless built with [`TokenSpec::keyed`]
    pub id: String,
    pub title: String,
    pub kind: TokenKind,
    pub value: TokenValue,
}

impl TokenSpec {
    pub fn new(title: impl Into<String>, value: impl Into<TokenValue>) -> Self {
        let title = title.into();
        let value = value.into();
        Self {
            id: format_token(&title),
            kind: value.kind(),
            title,
            value,
        }
    }

    /// Spec whose identifier comes from `id_source` instead of the title
    pub fn with_id(
        id_source: &str,
        title: impl Into<String>,
        value: impl Into<TokenValue>,
    ) -> Self {
        let value = value.into();
        Self {
            id: format_token(id_source),
            title: title.into(),
            kind: value.kind(),
            value,
        }
    }

    /// Spec keyed by `key` as given, used for host card outputs
    pub fn keyed(key: impl Into<String>, value: impl Into<TokenValue>) -> Self {
        let key = key.into();
        let value = value.into();
        Self {
            id: key.clone(),
            title: key,
            kind: value.kind(),
            value,
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_format_token() {
        assert_eq!(format_token("My Variable!!"), "my-variable-");
        assert_eq!(format_token("Dishwasher"), "dishwasher");
        assert_eq!(format_token("Living room / Lamp 2"), "living-room-lamp-2");
        assert_eq!(format_token("Zoë"), "zo-");
        assert_eq!(format_token(""), "");
    }

    #[test]
    fn test_format_token_idempotent() {
        let once = format_token("My Variable!!");
        assert_eq!(format_token(&once), once);
    }

    #[test]
    fn test_token_spec_derives_id_and_kind() {
        let spec = TokenSpec::new("Washer Duration", "1 hour");
        assert_eq!(spec.id, "washer-duration");
        assert_eq!(spec.kind, TokenKind::String);

        let spec = TokenSpec::with_id("Washer-duration", "Washer duur", "1 uur");
        assert_eq!(spec.id, "washer-duration");
        assert_eq!(spec.title, "Washer duur");

        let spec = TokenSpec::new("Meter", 12.5);
        assert_eq!(spec.kind, TokenKind::Number);
        assert_eq!(spec.value.to_string(), "12.5");
    }

    #[test]
    fn test_keyed_spec_keeps_case() {
        let spec = TokenSpec::keyed("booleanVal", true);
        assert_eq!(spec.id, "booleanVal");
        assert_eq!(spec.title, "booleanVal");
        assert_eq!(spec.kind, TokenKind::Boolean);
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(TokenValue::empty(TokenKind::String), TokenValue::from(""));
        assert_eq!(TokenValue::empty(TokenKind::Number).kind(), TokenKind::Number);
    }
}
