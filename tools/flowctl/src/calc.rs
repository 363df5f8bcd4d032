//! Stateless calculator commands

use anyhow::{Context, Result};
use chrono::Utc;
use colored::*;
use flow_calc::{
    calculate_duration, checked_evaluate, compare_values, evaluate, format_currency, format_token,
    parse_instant, replace_all, round_number, transform, value::format_number, Catalog,
    DurationFormat, DurationOutput, FlowValue, Localizer, TextTransform,
};

/// Print the elapsed time between two instants
pub fn duration(
    catalog: &Catalog,
    start: &str,
    end: Option<&str>,
    format: DurationFormat,
) -> Result<()> {
    let start = parse_instant(start).context("Invalid start instant")?;
    let end = match end {
        Some(end) => parse_instant(end).context("Invalid end instant")?,
        None => Utc::now(),
    };

    match calculate_duration(start, end, catalog, format) {
        DurationOutput::Text(text) => println!("{}", text),
        DurationOutput::Seconds(seconds) => println!("{}", seconds),
    }
    Ok(())
}

pub fn compare(baseline: &str, current: &str) -> Result<()> {
    let delta = compare_values(&FlowValue::from(baseline), &FlowValue::from(current));
    let text = format_number(delta);
    if delta > 0.0 {
        println!("{}", format!("+{}", text).green());
    } else if delta < 0.0 {
        println!("{}", text.red());
    } else {
        println!("{}", text);
    }
    Ok(())
}

pub fn calc(a: &str, operator: &str, b: &str, strict: bool) -> Result<()> {
    let a = FlowValue::from(a).to_number();
    let b = FlowValue::from(b).to_number();

    let result = if strict {
        checked_evaluate(operator, a, b)?
    } else {
        evaluate(operator, a, b)
    };
    println!("{}", format_number(result));
    Ok(())
}

pub fn round(value: &str, decimals: u32) -> Result<()> {
    println!("{}", format_number(round_number(&FlowValue::from(value), decimals)));
    Ok(())
}

pub fn text(kind: &str, input: &str) -> Result<()> {
    if kind.parse::<TextTransform>().is_err() {
        tracing::warn!(kind, "Unknown transform, text left unchanged");
    }
    println!("{}", transform(kind, input));
    Ok(())
}

pub fn replace(input: &str, needle: &str, replacement: &str) -> Result<()> {
    println!("{}", replace_all(input, needle, replacement));
    Ok(())
}

pub fn token_id(title: &str) -> Result<()> {
    println!("{}", format_token(title));
    Ok(())
}

pub fn currency(catalog: &Catalog, amount: &str, code: &str, locale: Option<&str>) -> Result<()> {
    let amount = FlowValue::from(amount).to_number();
    let locale = match locale {
        Some(locale) => locale.to_string(),
        None => catalog.translate("helpers.locale"),
    };
    println!("{}", format_currency(amount, code, &locale)?);
    Ok(())
}
