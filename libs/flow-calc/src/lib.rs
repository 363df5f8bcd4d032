//! flow-calc - Calculation helpers for Flow Utilities
//!
//! Pure, synchronous helpers behind the Flow Utilities flow cards. Nothing in
//! this crate performs I/O or keeps state, so every function can be called
//! from any number of tasks without coordination.
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use flow_calc::{calculate_duration, compare, evaluate, format_token, round_to, transform};
//! use flow_calc::{Catalog, DurationFormat, DurationOutput};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let end = start + Duration::seconds(90_061);
//! let i18n = Catalog::for_language("en");
//!
//! assert_eq!(
//!     calculate_duration(start, end, &i18n, DurationFormat::Text),
//!     DurationOutput::Text("1 day 1 hour 1 minute".to_string())
//! );
//! assert_eq!(compare(10.0, 12.345), 2.35);
//! assert_eq!(evaluate("/", 7.0, 2.0), 3.5);
//! assert_eq!(round_to(3.14159, 2), 3.14);
//! assert_eq!(transform("titleCase", "the QUICK fox"), "The Quick Fox");
//! assert_eq!(format_token("My Variable!!"), "my-variable-");
//! ```
//!
//! # Helpers
//!
//! | Helper | Signature | Result |
//! |--------|-----------|--------|
//! | `calculate_duration` | `(start, end, i18n, format)` | Localized text or elapsed seconds |
//! | `compare` | `(baseline, current)` | `current - baseline`, 2 decimals |
//! | `evaluate` | `(symbol, a, b)` | `a <op> b`, 4 decimals, unknown op = 0 |
//! | `checked_evaluate` | `(symbol, a, b)` | As `evaluate`, errors on unknown op or `/ 0` |
//! | `round_number` | `(value, decimals)` | Rounded number, falsy input = 0 |
//! | `transform` | `(kind, text)` | Case-transformed text |
//! | `format_token` | `(title)` | Lower-case hyphenated identifier |
//! | `format_currency` | `(amount, code, locale)` | Localized money string |

pub mod arithmetic;
pub mod comparison;
pub mod currency;
pub mod duration;
pub mod error;
pub mod instant;
pub mod locale;
pub mod rounding;
pub mod text;
pub mod token;
pub mod value;

// Re-exports for convenience
pub use error::{CalcError, Result};
pub use locale::{Catalog, Localizer};
pub use value::FlowValue;

pub use arithmetic::{checked_evaluate, evaluate, Operator};
pub use comparison::{compare, compare_values};
pub use currency::format_currency;
pub use duration::{
    calculate_duration, elapsed_seconds, DurationFormat, DurationOutput, DurationParts,
};
pub use instant::parse_instant;
pub use rounding::{round_number, round_to};
pub use text::{replace_all, transform, TextTransform};
pub use token::{format_token, TokenKind, TokenSpec, TokenValue};
