//! Localized currency formatting
//!
//! Formats an amount the way the Homey UI shows money for the user's
//! language: `€1,234.56` in English, `€ 1.234,56` in Dutch, `1.234,56 €` in
//! German. The conventions table covers the languages Homey ships with;
//! anything else falls back to English conventions.

use crate::error::{CalcError, Result};
use crate::locale::primary_subtag;
use crate::rounding::round_to;

const NBSP: char = '\u{a0}';
const NARROW_NBSP: char = '\u{202f}';

/// Currencies without minor units
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];

/// Number and symbol layout for one language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleConventions {
    pub group_separator: char,
    pub decimal_separator: char,
    pub symbol_first: bool,
    pub symbol_spaced: bool,
    /// Integer digits needed before grouping kicks in
    pub min_grouping_digits: usize,
}

impl LocaleConventions {
    const fn new(
        group_separator: char,
        decimal_separator: char,
        symbol_first: bool,
        symbol_spaced: bool,
        min_grouping_digits: usize,
    ) -> Self {
        Self {
            group_separator,
            decimal_separator,
            symbol_first,
            symbol_spaced,
            min_grouping_digits,
        }
    }

    /// Conventions for a BCP 47 tag, English when the language is unknown
    pub fn for_tag(tag: &str) -> Self {
        match primary_subtag(tag).as_str() {
            "nl" => Self::new('.', ',', true, true, 4),
            "de" | "it" => Self::new('.', ',', false, true, 4),
            "da" => Self::new('.', ',', false, true, 4),
            "es" => Self::new('.', ',', false, true, 5),
            "fr" => Self::new(NARROW_NBSP, ',', false, true, 4),
            "sv" | "no" | "nb" | "ru" => Self::new(NBSP, ',', false, true, 4),
            "pl" => Self::new(NBSP, ',', false, true, 5),
            _ => Self::new(',', '.', true, false, 4),
        }
    }
}

/// Display symbol for an ISO 4217 code, the code itself when unknown
pub fn currency_symbol(code: &str) -> &str {
    match code {
        "EUR" => "€",
        "USD" => "$",
        "GBP" => "£",
        "JPY" => "¥",
        "KRW" => "₩",
        "INR" => "₹",
        "RUB" => "₽",
        "PLN" => "zł",
        "SEK" | "NOK" => "kr",
        "DKK" => "kr.",
        "CHF" => "CHF",
        "CNY" => "CN¥",
        "AUD" => "A$",
        "CAD" => "CA$",
        other => other,
    }
}

/// Fraction digits shown for a currency
pub fn currency_decimals(code: &str) -> u32 {
    if ZERO_DECIMAL_CURRENCIES.contains(&code) {
        0
    } else {
        2
    }
}

/// Format `amount` in `currency` using the conventions of `locale_tag`
pub fn format_currency(amount: f64, currency: &str, locale_tag: &str) -> Result<String> {
    if !amount.is_finite() {
        return Err(CalcError::NonFiniteAmount(amount));
    }

    let code = currency.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CalcError::invalid_currency(currency));
    }

    let conventions = LocaleConventions::for_tag(locale_tag);
    let decimals = currency_decimals(&code);
    let rounded = round_to(amount.abs(), decimals);
    let negative = amount < 0.0 && rounded != 0.0;

    let digits = format!("{:.*}", decimals as usize, rounded);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut number = group_digits(int_part, &conventions);
    if let Some(frac) = frac_part {
        number.push(conventions.decimal_separator);
        number.push_str(frac);
    }

    let symbol = currency_symbol(&code);
    let sign = if negative { "-" } else { "" };
    let gap = if conventions.symbol_spaced {
        NBSP.to_string()
    } else {
        String::new()
    };

    let formatted = if conventions.symbol_first {
        if conventions.symbol_spaced {
            format!("{}{}{}{}", symbol, gap, sign, number)
        } else {
            format!("{}{}{}", sign, symbol, number)
        }
    } else {
        format!("{}{}{}{}", sign, number, gap, symbol)
    };

    Ok(formatted)
}

fn group_digits(int_part: &str, conventions: &LocaleConventions) -> String {
    if int_part.len() < conventions.min_grouping_digits {
        return int_part.to_string();
    }

    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(conventions.group_separator);
        }
        out.push(c);
    }
    out
}
