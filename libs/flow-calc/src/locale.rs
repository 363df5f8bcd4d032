//! Localization lookup
//!
//! The duration formatter needs unit words (`helpers.day`, `helpers.days`, ...)
//! and the currency formatter a locale tag (`helpers.locale`). Both go through
//! the [`Localizer`] trait so the host can plug in its own translation table.

use crate::error::{CalcError, Result};
use serde_json::Value;

const EN_CATALOG: &str = include_str!("../locales/en.json");
const NL_CATALOG: &str = include_str!("../locales/nl.json");

/// Maps a dotted key to a display string
pub trait Localizer {
    fn translate(&self, key: &str) -> String;
}

impl<F> Localizer for F
where
    F: Fn(&str) -> String,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

/// Nested JSON translation table
///
/// Unknown keys translate to the key itself.
#[derive(Debug, Clone)]
pub struct Catalog {
    language: String,
    table: Value,
}

impl Catalog {
    /// Parse a catalog from JSON source
    pub fn from_json(language: impl Into<String>, source: &str) -> Result<Self> {
        let table: Value = serde_json::from_str(source)
            .map_err(|e| CalcError::locale(format!("Failed to parse catalog: {}", e)))?;
        if !table.is_object() {
            return Err(CalcError::locale("Catalog root must be an object"));
        }
        Ok(Self {
            language: language.into(),
            table,
        })
    }

    /// Bundled catalog for a language tag, English when not bundled
    pub fn for_language(language: &str) -> Self {
        let primary = primary_subtag(language);
        let (language, source) = match primary.as_str() {
            "nl" => ("nl", NL_CATALOG),
            _ => ("en", EN_CATALOG),
        };
        Self {
            language: language.to_string(),
            table: serde_json::from_str(source).unwrap_or(Value::Null),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Look up a dotted key, `None` when absent or not a string
    pub fn get(&self, key: &str) -> Option<&str> {
        key.split('.')
            .try_fold(&self.table, |node, part| node.get(part))
            .and_then(Value::as_str)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::for_language("en")
    }
}

impl Localizer for Catalog {
    fn translate(&self, key: &str) -> String {
        self.get(key).unwrap_or(key).to_string()
    }
}

/// Lower-cased language subtag of a BCP 47 tag (`"nl-NL"` -> `"nl"`)
pub fn primary_subtag(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalogs() {
        let en = Catalog::for_language("en");
        assert_eq!(en.translate("helpers.days"), "days");
        assert_eq!(en.translate("helpers.locale"), "en-GB");

        let nl = Catalog::for_language("nl-NL");
        assert_eq!(nl.language(), "nl");
        assert_eq!(nl.translate("helpers.day"), "dag");
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let catalog = Catalog::for_language("fr");
        assert_eq!(catalog.language(), "en");
        assert_eq!(catalog.translate("helpers.minute"), "minute");
    }

    #[test]
    fn test_missing_key_returns_key() {
        let catalog = Catalog::default();
        assert_eq!(catalog.translate("helpers.weeks"), "helpers.weeks");
        assert_eq!(catalog.translate("helpers"), "helpers");
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(Catalog::from_json("xx", "[1, 2]").is_err());
        assert!(Catalog::from_json("xx", "{").is_err());
        let custom = Catalog::from_json("de", r#"{"helpers": {"day": "Tag"}}"#).unwrap();
        assert_eq!(custom.translate("helpers.day"), "Tag");
    }

    #[test]
    fn test_closure_localizer() {
        let upper = |key: &str| key.to_uppercase();
        assert_eq!(upper.translate("helpers.day"), "HELPERS.DAY");
    }
}
