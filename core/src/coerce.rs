//! Type coercion registry.
//!
//! Maps each [`ValueType`] to a conversion from a raw string to a typed
//! [`Value`]. Lookup goes through a static table keyed by canonical type
//! name; names missing from the table fall back to string coercion.
//!
//! # Examples
//!
//! ```
//! use commandr_core::{Value, ValueType, coerce};
//!
//! assert_eq!(coerce(&ValueType::Integer, "42", None).unwrap(), Value::Integer(42));
//! assert_eq!(coerce(&ValueType::Boolean, "Yes", None).unwrap(), Value::Bool(true));
//! assert_eq!(
//!     coerce(&ValueType::Other("path".into()), "/tmp", None).unwrap(),
//!     Value::String("/tmp".into()),
//! );
//! assert!(coerce(&ValueType::Boolean, "maybe", None).is_err());
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::{Value, ValueType};

/// Failure converting a raw string to a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("invalid boolean value '{value}' (expected 1/0, true/false, yes/no or on/off)")]
    InvalidBoolean { value: String },

    #[error("invalid integer value '{value}'")]
    InvalidInteger { value: String },

    #[error("invalid float value '{value}'")]
    InvalidFloat { value: String },

    #[error("invalid datetime value '{value}' for format '{format}'")]
    InvalidDateTime { value: String, format: String },

    /// A datetime coercion was requested without a pattern.
    #[error("datetime value '{value}' cannot be parsed without a format")]
    MissingFormat { value: String },
}

/// Signature shared by every registry entry. The second argument is the
/// parameter's `format` pattern, used only by datetime coercion.
pub type Coercer = fn(&str, Option<&str>) -> Result<Value, CoercionError>;

const TRUTHY: &[&str] = &["1", "true", "yes", "on", "y", "t"];
const FALSY: &[&str] = &["0", "false", "no", "off", "n", "f"];

static COERCERS: &[(&str, Coercer)] = &[
    ("string", coerce_string as Coercer),
    ("integer", coerce_integer as Coercer),
    ("float", coerce_float as Coercer),
    ("boolean", coerce_bool as Coercer),
    ("switch", coerce_bool as Coercer),
    ("datetime", coerce_datetime as Coercer),
];

/// Returns the registry entry for `value_type`, or string coercion when the
/// type has no entry.
pub fn coercer_for(value_type: &ValueType) -> Coercer {
    let name = value_type.name();
    COERCERS
        .iter()
        .find(|(entry, _)| *entry == name)
        .map(|(_, coercer)| *coercer)
        .unwrap_or(coerce_string)
}

/// Coerces `raw` to `value_type`.
///
/// `format` is required for [`ValueType::DateTime`] and ignored otherwise.
///
/// # Errors
///
/// Returns a [`CoercionError`] naming the offending string when it is not a
/// valid literal for the type.
pub fn coerce(
    value_type: &ValueType,
    raw: &str,
    format: Option<&str>,
) -> Result<Value, CoercionError> {
    coercer_for(value_type)(raw, format)
}

/// Parses a boolean token, case-insensitively.
///
/// # Examples
///
/// ```
/// use commandr_core::parse_bool;
///
/// assert_eq!(parse_bool("ON").unwrap(), true);
/// assert_eq!(parse_bool("0").unwrap(), false);
/// assert!(parse_bool("maybe").is_err());
/// ```
pub fn parse_bool(raw: &str) -> Result<bool, CoercionError> {
    let token = raw.trim().to_ascii_lowercase();
    if TRUTHY.contains(&token.as_str()) {
        Ok(true)
    } else if FALSY.contains(&token.as_str()) {
        Ok(false)
    } else {
        Err(CoercionError::InvalidBoolean {
            value: raw.to_string(),
        })
    }
}

/// Resolves a YAML 1.1 boolean word (`yes`/`no`/`on`/`off`/`true`/`false`
/// in lowercase, capitalized or uppercase form).
///
/// YAML 1.2 parsers read these words as strings; definition and config files
/// follow the 1.1 rules.
///
/// ```
/// use commandr_core::parse_yaml_bool;
///
/// assert_eq!(parse_yaml_bool("Yes"), Some(true));
/// assert_eq!(parse_yaml_bool("OFF"), Some(false));
/// assert_eq!(parse_yaml_bool("oN"), None);
/// assert_eq!(parse_yaml_bool("y"), None);
/// ```
pub fn parse_yaml_bool(raw: &str) -> Option<bool> {
    match raw {
        "yes" | "Yes" | "YES" | "on" | "On" | "ON" | "true" | "True" | "TRUE" => Some(true),
        "no" | "No" | "NO" | "off" | "Off" | "OFF" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Parses `raw` against a `strftime`-style pattern.
///
/// Date-only patterns such as `%Y-%m-%d` yield midnight of that day.
pub fn parse_datetime(raw: &str, format: &str) -> Result<NaiveDateTime, CoercionError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(raw, format)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CoercionError::InvalidDateTime {
            value: raw.to_string(),
            format: format.to_string(),
        })
}

fn coerce_string(raw: &str, _format: Option<&str>) -> Result<Value, CoercionError> {
    Ok(Value::String(raw.to_string()))
}

fn coerce_integer(raw: &str, _format: Option<&str>) -> Result<Value, CoercionError> {
    raw.trim()
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|_| CoercionError::InvalidInteger {
            value: raw.to_string(),
        })
}

fn coerce_float(raw: &str, _format: Option<&str>) -> Result<Value, CoercionError> {
    raw.trim()
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| CoercionError::InvalidFloat {
            value: raw.to_string(),
        })
}

fn coerce_bool(raw: &str, _format: Option<&str>) -> Result<Value, CoercionError> {
    parse_bool(raw).map(Value::Bool)
}

fn coerce_datetime(raw: &str, format: Option<&str>) -> Result<Value, CoercionError> {
    let format = format.ok_or_else(|| CoercionError::MissingFormat {
        value: raw.to_string(),
    })?;
    parse_datetime(raw, format).map(Value::DateTime)
}
