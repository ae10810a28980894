//! Value and type definitions shared by every layer of the resolver.
//!
//! [`ValueType`] is the closed set of declared parameter types, [`Value`] is
//! the typed result of coercing a raw string (or a pre-typed default), and
//! [`Source`] records which precedence tier supplied a resolved value.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Declared type of a parameter.
///
/// Serialized as its canonical lowercase name. The legacy short names `str`,
/// `int` and `bool` are accepted on input and normalized. Any other name is
/// kept verbatim as [`ValueType::Other`] and coerces like a string.
///
/// # Examples
///
/// ```
/// use commandr_core::ValueType;
///
/// assert_eq!(ValueType::from_name("int"), ValueType::Integer);
/// assert_eq!(ValueType::from_name("switch"), ValueType::Switch);
/// assert_eq!(ValueType::from_name("path").name(), "path");
/// assert_eq!(ValueType::default(), ValueType::String);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueType {
    /// Plain string (the default).
    #[default]
    String,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit float.
    Float,
    /// Boolean that takes a value token (`--flag yes`).
    Boolean,
    /// Boolean presence flag that takes no value token.
    Switch,
    /// Date/time parsed against the parameter's `format` pattern.
    DateTime,
    /// Unrecognized type name, coerced as a string.
    Other(String),
}

impl ValueType {
    /// Parses a declared type name, falling back to [`ValueType::Other`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "string" | "str" => Self::String,
            "integer" | "int" => Self::Integer,
            "float" => Self::Float,
            "boolean" | "bool" => Self::Boolean,
            "switch" => Self::Switch,
            "datetime" => Self::DateTime,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the canonical name written to schema definitions.
    pub fn name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Switch => "switch",
            Self::DateTime => "datetime",
            Self::Other(name) => name,
        }
    }

    /// Returns `true` for the zero-argument presence flag type.
    pub fn is_switch(&self) -> bool {
        matches!(self, Self::Switch)
    }
}

impl From<String> for ValueType {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<ValueType> for String {
    fn from(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed parameter value.
///
/// Deserializes from scalars only (booleans, integers, floats, strings).
/// [`Value::DateTime`] is produced by coercion and serializes as an ISO-8601
/// string.
///
/// # Examples
///
/// ```
/// use commandr_core::Value;
///
/// let v: Value = serde_json::from_str("12345").unwrap();
/// assert_eq!(v, Value::Integer(12345));
///
/// let v: Value = serde_json::from_str("\"config.yaml\"").unwrap();
/// assert_eq!(v.as_str(), Some("config.yaml"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    #[serde(skip_deserializing)]
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Short label of the stored variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

/// Optional definition field that tells an omitted key from an explicit
/// `null`.
///
/// Both read as "not set"; they differ only when serialized, so a definition
/// written with `"help": null` is written back the same way. Pair with
/// `#[serde(default, skip_serializing_if = "Field::is_absent")]`.
///
/// # Examples
///
/// ```
/// use commandr_core::Field;
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Entry {
///     #[serde(default, skip_serializing_if = "Field::is_absent")]
///     help: Field<String>,
/// }
///
/// let entry: Entry = serde_json::from_str(r#"{"help": null}"#).unwrap();
/// assert_eq!(entry.help, Field::Null);
/// assert_eq!(entry.help.get(), None);
/// assert_eq!(serde_json::to_string(&entry).unwrap(), r#"{"help":null}"#);
///
/// let entry: Entry = serde_json::from_str("{}").unwrap();
/// assert_eq!(serde_json::to_string(&entry).unwrap(), "{}");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// Key not present.
    Absent,
    /// Key present with a `null` value.
    Null,
    /// Key present with a value.
    Set(T),
}

impl<T> Field<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Set)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => value.serialize(serializer),
            Self::Absent | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// Precedence tier that supplied a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Source {
    /// Given on the command line.
    Cli,
    /// Read from the parameter's environment variable.
    Env,
    /// Taken from the schema default.
    Default,
    /// No tier supplied a value.
    None,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cli => "CLI",
            Self::Env => "ENV",
            Self::Default => "DEFAULT",
            Self::None => "NONE",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_aliases_normalize() {
        assert_eq!(ValueType::from_name("str"), ValueType::String);
        assert_eq!(ValueType::from_name("bool"), ValueType::Boolean);
        assert_eq!(String::from(ValueType::from_name("int")), "integer");
    }

    #[test]
    fn test_unknown_type_name_is_preserved() {
        let ty: ValueType = serde_json::from_str("\"path\"").unwrap();
        assert_eq!(ty, ValueType::Other("path".into()));
        assert_eq!(serde_json::to_string(&ty).unwrap(), "\"path\"");
    }

    #[test]
    fn test_value_deserializes_scalars() {
        assert_eq!(
            serde_json::from_str::<Value>("true").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(serde_json::from_str::<Value>("-3").unwrap(), Value::Integer(-3));
        assert_eq!(serde_json::from_str::<Value>("0.5").unwrap(), Value::Float(0.5));
        assert!(serde_json::from_str::<Value>("[1, 2]").is_err());
    }

    #[test]
    fn test_datetime_serializes_as_string() {
        let dt = chrono::NaiveDate::from_ymd_opt(2022, 5, 12)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let json = serde_json::to_value(Value::DateTime(dt)).unwrap();
        assert_eq!(json, serde_json::json!("2022-05-12T00:00:00"));
    }

    #[test]
    fn test_field_keeps_null_apart_from_absent() {
        let null: Field<i64> = serde_json::from_str("null").unwrap();
        let set: Field<i64> = serde_json::from_str("7").unwrap();
        assert_eq!(null, Field::Null);
        assert_eq!(set.get(), Some(&7));
        assert!(Field::<i64>::default().is_absent());
        assert_eq!(serde_json::to_string(&null).unwrap(), "null");
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(serde_json::to_string(&Source::Cli).unwrap(), "\"CLI\"");
        assert_eq!(Source::Default.to_string(), "DEFAULT");
    }
}
