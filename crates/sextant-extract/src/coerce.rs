//! Scalar coercion.
//!
//! Turns a raw request string into the typed value its [`PropertyType`]
//! declares. Only the date/time formats can fail; numbers and booleans use
//! lenient scripting-language conversions, and unconstrained or unknown
//! types pass the string through untouched.
//!
//! | Declared type        | Result                                              |
//! |----------------------|-----------------------------------------------------|
//! | `string`             | [`Scalar::String`]                                  |
//! | `string` + date      | [`Scalar::Date`], `YYYY-MM-DD`                      |
//! | `string` + date-time | [`Scalar::DateTime`], RFC 3339 (naive read as UTC)  |
//! | `string` + time      | [`Scalar::Time`], `HH:MM[:SS[.fff]]`                |
//! | `integer`            | [`Scalar::Integer`], leading numeric prefix, else 0 |
//! | `number`             | [`Scalar::Number`], leading numeric prefix, else 0  |
//! | `boolean`            | [`Scalar::Boolean`], false for `""`, `0`, `false`   |
//! | `any` / reference    | [`Scalar::Raw`]                                     |

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use sextant_core::{Format, PropertyType};
use thiserror::Error;

/// A coerced scalar value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Plain string.
    String(String),
    /// Whole number.
    Integer(i64),
    /// Double precision number.
    Number(f64),
    /// Boolean flag.
    Boolean(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time with offset.
    DateTime(DateTime<FixedOffset>),
    /// Time of day.
    Time(NaiveTime),
    /// Uninterpreted raw value.
    Raw(String),
}

impl Scalar {
    /// Returns the integer value.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the numeric value; integers widen.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text of a string or raw value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) | Self::Raw(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the date value.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the date-time value.
    #[must_use]
    pub fn as_date_time(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the time value.
    #[must_use]
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Self::Time(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(v) | Self::Raw(v) => f.write_str(v),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{v}"),
            Self::DateTime(v) => f.write_str(&v.to_rfc3339()),
            Self::Time(v) => write!(f, "{v}"),
        }
    }
}

/// A raw value did not match its declared date/time format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {format}")]
pub struct CoercionError {
    format: Format,
    value: String,
}

impl CoercionError {
    /// Returns the format that was expected.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the offending raw value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Coerces a raw value into the declared type.
///
/// `None` stays `None` whatever the declared type; deciding whether that is
/// acceptable is the caller's job.
///
/// # Example
///
/// ```
/// use sextant_core::{Format, PropertyType};
/// use sextant_extract::{coerce, Scalar};
///
/// assert_eq!(coerce(&PropertyType::Integer, Some("42")).unwrap(), Some(Scalar::Integer(42)));
/// assert_eq!(coerce(&PropertyType::Boolean, Some("0")).unwrap(), Some(Scalar::Boolean(false)));
/// assert_eq!(coerce(&PropertyType::Integer, None).unwrap(), None);
/// assert!(coerce(&PropertyType::formatted(Format::Date), Some("tomorrow")).is_err());
/// ```
pub fn coerce(declared: &PropertyType, raw: Option<&str>) -> Result<Option<Scalar>, CoercionError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let value = match declared {
        PropertyType::String { format: None } => Scalar::String(raw.to_string()),
        PropertyType::String {
            format: Some(format),
        } => parse_format(*format, raw)?,
        PropertyType::Integer => Scalar::Integer(to_integer(raw)),
        PropertyType::Number => Scalar::Number(to_number(raw)),
        PropertyType::Boolean => Scalar::Boolean(to_boolean(raw)),
        PropertyType::Any | PropertyType::Reference { .. } => Scalar::Raw(raw.to_string()),
    };

    Ok(Some(value))
}

/// Parses `raw` according to a date/time format.
pub fn parse_format(format: Format, raw: &str) -> Result<Scalar, CoercionError> {
    let parsed = match format {
        Format::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(Scalar::Date),
        Format::DateTime => parse_date_time(raw).map(Scalar::DateTime),
        Format::Time => NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .ok()
            .map(Scalar::Time),
    };

    parsed.ok_or_else(|| CoercionError {
        format,
        value: raw.to_string(),
    })
}

fn parse_date_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(value);
    }
    // No offset given: read as UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Length of the leading decimal literal in `s` (sign, digits, fraction,
/// exponent), and whether it has a fraction or exponent.
fn numeric_prefix(s: &str) -> (usize, bool) {
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut is_float = false;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
            is_float = true;
        }
    }

    if digits == 0 {
        return (0, false);
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
            is_float = true;
        }
    }

    (end, is_float)
}

fn to_integer(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (len, is_float) = numeric_prefix(trimmed);
    let literal = &trimmed[..len];

    if len == 0 {
        return 0;
    }
    if !is_float {
        if let Ok(value) = literal.parse::<i64>() {
            return value;
        }
    }
    // Float literal or out of i64 range: go through f64, saturating.
    literal.parse::<f64>().map(|v| v as i64).unwrap_or(0)
}

fn to_number(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    let (len, _) = numeric_prefix(trimmed);
    trimmed[..len].parse::<f64>().unwrap_or(0.0)
}

fn to_boolean(raw: &str) -> bool {
    !(raw.is_empty() || raw == "0" || raw.eq_ignore_ascii_case("false"))
}
