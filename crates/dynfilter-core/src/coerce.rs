//! Value coercion.
//!
//! Turns the raw string of a condition into one or two typed constants for
//! the resolved field's scalar type. Nullable and non-nullable fields share
//! the same rules.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::catalog::ScalarType;
use crate::error::Error;
use dynfilter_proto::{QueryOperator, Value, LIST_SEPARATOR, RANGE_SEPARATOR, TRUE_LITERAL};

/// Date/time layouts accepted after RFC 3339, culture-invariant.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts; the time is midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Constants produced for one condition.
///
/// `first` is `None` when the raw value was withheld by the list-separator
/// guard. `second` is only set for range operators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operands {
    /// The constant, or the range start.
    pub first: Option<Value>,
    /// The range end.
    pub second: Option<Value>,
}

impl Operands {
    /// No constant was produced.
    pub fn none() -> Self {
        Self::default()
    }

    /// A single constant.
    pub fn single(value: Value) -> Self {
        Self {
            first: Some(value),
            second: None,
        }
    }

    /// A `(start, end)` pair.
    pub fn range(start: Value, end: Value) -> Self {
        Self {
            first: Some(start),
            second: Some(end),
        }
    }

    /// Check if no constant was produced.
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }
}

/// Parses raw condition values into typed constants.
#[derive(Debug, Clone, Default)]
pub struct ValueParser {
    extra_datetime_formats: Vec<String>,
}

impl ValueParser {
    /// Create a parser with the built-in formats only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser that also tries `formats` for date/time values.
    pub fn with_datetime_formats(formats: Vec<String>) -> Self {
        Self {
            extra_datetime_formats: formats,
        }
    }

    /// Coerce a raw value for `operator` on a field of type `scalar`.
    ///
    /// String and integer values containing the list separator produce no
    /// constant. `Between` values are split on the range separator into
    /// exactly two bounds.
    pub fn coerce(
        &self,
        field: &str,
        raw: &str,
        scalar: ScalarType,
        operator: QueryOperator,
    ) -> Result<Operands, Error> {
        if scalar.is_list_guarded() && raw.contains(LIST_SEPARATOR) {
            return Ok(Operands::none());
        }

        if operator.is_range() {
            let bounds: Vec<&str> = raw.split(RANGE_SEPARATOR).collect();
            if bounds.len() != 2 {
                return Err(Error::ValueParse {
                    field: field.to_string(),
                    value: raw.to_string(),
                    expected: scalar,
                    reason: format!(
                        "expected two values separated by `{RANGE_SEPARATOR}`, found {}",
                        bounds.len()
                    ),
                });
            }
            let start = self.parse(field, bounds[0], scalar)?;
            let end = self.parse(field, bounds[1], scalar)?;
            return Ok(Operands::range(start, end));
        }

        self.parse(field, raw, scalar).map(Operands::single)
    }

    /// Parse one raw value as `scalar`.
    pub fn parse(&self, field: &str, raw: &str, scalar: ScalarType) -> Result<Value, Error> {
        let parse_error = |reason: String| Error::ValueParse {
            field: field.to_string(),
            value: raw.to_string(),
            expected: scalar,
            reason,
        };

        match scalar {
            ScalarType::String => Ok(Value::String(raw.to_string())),
            ScalarType::Int32 => raw
                .trim()
                .parse::<i32>()
                .map(Value::Int32)
                .map_err(|e| parse_error(e.to_string())),
            ScalarType::Int64 => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|e| parse_error(e.to_string())),
            ScalarType::Float32 => strip_group_separators(raw.trim())
                .map_err(&parse_error)?
                .parse::<f32>()
                .map(Value::Float32)
                .map_err(|e| parse_error(e.to_string())),
            ScalarType::Float64 => strip_group_separators(raw.trim())
                .map_err(&parse_error)?
                .parse::<f64>()
                .map(Value::Float64)
                .map_err(|e| parse_error(e.to_string())),
            ScalarType::Decimal => strip_group_separators(raw.trim())
                .and_then(|digits| parse_decimal(&digits))
                .map(Value::Decimal)
                .map_err(parse_error),
            ScalarType::Bool => Ok(Value::Bool(raw == TRUE_LITERAL)),
            ScalarType::DateTime => self
                .parse_datetime(raw.trim())
                .map(Value::DateTime)
                .ok_or_else(|| parse_error("unrecognized date/time format".to_string())),
            ScalarType::Uuid => Uuid::parse_str(raw.trim())
                .map(Value::Uuid)
                .map_err(|e| parse_error(e.to_string())),
        }
    }

    fn parse_datetime(&self, raw: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }

        let extra = self.extra_datetime_formats.iter().map(String::as_str);

        DATETIME_FORMATS
            .iter()
            .copied()
            .chain(extra.clone())
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .copied()
                    .chain(extra)
                    .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }
}

/// Remove thousands separators from the integer part of a number.
///
/// Groups must be well formed: one to three leading digits, then groups of
/// exactly three. A separator in the fraction or exponent is rejected.
fn strip_group_separators(raw: &str) -> Result<Cow<'_, str>, String> {
    if !raw.contains(LIST_SEPARATOR) {
        return Ok(Cow::Borrowed(raw));
    }

    let unsigned = raw.trim_start_matches(['+', '-']);
    let sign = &raw[..raw.len() - unsigned.len()];
    let split = unsigned.find(['.', 'e', 'E']).unwrap_or(unsigned.len());
    let (integer, rest) = unsigned.split_at(split);

    let misplaced = || format!("misplaced group separator `{LIST_SEPARATOR}`");
    if rest.contains(LIST_SEPARATOR) {
        return Err(misplaced());
    }

    let mut groups = integer.split(LIST_SEPARATOR);
    let lead = groups.next().unwrap_or_default();
    let all_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    if !(1..=3).contains(&lead.len()) || !all_digits(lead) {
        return Err(misplaced());
    }
    if !groups.all(|g| g.len() == 3 && all_digits(g)) {
        return Err(misplaced());
    }

    let digits = integer.replace(LIST_SEPARATOR, "");
    Ok(Cow::Owned(format!("{sign}{digits}{rest}")))
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| e.to_string())
}
