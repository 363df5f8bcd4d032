//! Text transforms

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Case transforms offered by the convert-text card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextTransform {
    Lowercase,
    Uppercase,
    CapitalizeFirstLetter,
    TitleCase,
}

impl TextTransform {
    pub fn name(&self) -> &'static str {
        match self {
            TextTransform::Lowercase => "lowercase",
            TextTransform::Uppercase => "uppercase",
            TextTransform::CapitalizeFirstLetter => "capitalizeFirstLetter",
            TextTransform::TitleCase => "titleCase",
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            TextTransform::Lowercase => text.to_lowercase(),
            TextTransform::Uppercase => text.to_uppercase(),
            TextTransform::CapitalizeFirstLetter => capitalize_first(&text.to_lowercase()),
            TextTransform::TitleCase => text
                .to_lowercase()
                .split(' ')
                .filter(|word| !word.is_empty())
                .map(capitalize_first)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl FromStr for TextTransform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lowercase" => Ok(TextTransform::Lowercase),
            "uppercase" => Ok(TextTransform::Uppercase),
            "capitalizeFirstLetter" => Ok(TextTransform::CapitalizeFirstLetter),
            "titleCase" => Ok(TextTransform::TitleCase),
            other => Err(format!("unknown text transform: {}", other)),
        }
    }
}

/// Apply the transform named `kind`; unknown kinds return `text` unchanged
pub fn transform(kind: &str, text: &str) -> String {
    match kind.parse::<TextTransform>() {
        Ok(t) => t.apply(text),
        Err(_) => text.to_string(),
    }
}

/// Replace every occurrence of `needle`; an empty needle changes nothing
pub fn replace_all(input: &str, needle: &str, replacement: &str) -> String {
    if needle.is_empty() {
        return input.to_string();
    }
    input.replace(needle, replacement)
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_case_folding() {
        assert_eq!(transform("lowercase", "MiXeD"), "mixed");
        assert_eq!(transform("uppercase", "MiXeD"), "MIXED");
    }

    #[test]
    fn test_capitalize_first_letter() {
        assert_eq!(transform("capitalizeFirstLetter", "HELLO"), "Hello");
        assert_eq!(transform("capitalizeFirstLetter", "hello WORLD"), "Hello world");
        assert_eq!(transform("capitalizeFirstLetter", ""), "");
        assert_eq!(transform("capitalizeFirstLetter", "élan"), "Élan");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(transform("titleCase", "the QUICK fox"), "The Quick Fox");
        assert_eq!(transform("titleCase", "the  quick   fox"), "The Quick Fox");
        assert_eq!(transform("titleCase", " leading"), "Leading");
    }

    #[test]
    fn test_unknown_kind_is_identity() {
        assert_eq!(transform("reverse", "Keep Me"), "Keep Me");
        assert_eq!(transform("TitleCase", "keep me"), "keep me");
    }

    #[test]
    fn test_replace_all() {
        assert_eq!(replace_all("a-b-c", "-", "+"), "a+b+c");
        assert_eq!(replace_all("abc", "", "x"), "abc");
        assert_eq!(replace_all("Washer done", "Washer", "Dryer"), "Dryer done");
    }

    #[test]
    fn test_serde_names_match_card_values() {
        let t: TextTransform = serde_json::from_str("\"capitalizeFirstLetter\"").unwrap();
        assert_eq!(t, TextTransform::CapitalizeFirstLetter);
        assert_eq!(t.name(), "capitalizeFirstLetter");
    }
}
