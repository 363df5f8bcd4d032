//! Instant parsing
//!
//! Stored start instants come back from the settings store as strings, either
//! RFC 3339 timestamps, plain dates or epoch milliseconds.

use crate::error::{CalcError, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Parse an instant from its stored representation
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CalcError::invalid_instant("empty input"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| CalcError::invalid_instant(trimmed));
    }

    if let Ok(millis) = trimmed.parse::<i64>() {
        return Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| CalcError::invalid_instant(format!("{} out of range", millis)));
    }

    Err(CalcError::invalid_instant(trimmed))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_instant("2021-10-05T12:30:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2021-10-05T10:30:00+00:00");
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_instant("2021-10-05").unwrap();
        assert_eq!(dt.timestamp(), 1_633_392_000);
    }

    #[test]
    fn test_parse_epoch_millis() {
        let dt = parse_instant("1633392000000").unwrap();
        assert_eq!(dt.timestamp(), 1_633_392_000);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_instant("yesterday"),
            Err(CalcError::InvalidInstant(_))
        ));
        assert!(parse_instant("   ").is_err());
    }
}
