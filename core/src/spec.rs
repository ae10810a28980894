//! Parameter specification.
//!
//! A [`ParamSpec`] describes one named parameter: its CLI aliases, declared
//! type, default, environment variable, and whether its resolved value names
//! a config file to load. The same type is produced by the builder methods
//! and by deserializing a schema definition file, so both paths share
//! [`validate_param`](crate::validate_param).

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::{Field, Value, ValueType, parse_yaml_bool};

/// Separator between aliases in the `cli` field (e.g. `"-c|--count"`).
pub const ALIAS_SEPARATOR: char = '|';

static DEFAULT_TYPE: ValueType = ValueType::String;

/// Declaration of a single resolvable parameter.
///
/// Optional fields keep their absence (or explicit `null`) and the declared
/// type spelling, so a definition read from disk serializes back to the same
/// structure.
///
/// # Examples
///
/// ```
/// use commandr_core::{ParamSpec, Value, ValueType};
///
/// let count = ParamSpec::new("count", "-c|--count")
///     .with_type(ValueType::Integer)
///     .with_default(12345i64)
///     .with_env("COUNT")
///     .with_help("How many items to process");
///
/// assert_eq!(count.aliases().collect::<Vec<_>>(), vec!["-c", "--count"]);
/// assert_eq!(count.default(), Some(&Value::Integer(12345)));
/// assert!(!count.is_required());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    name: String,
    cli: String,
    #[serde(rename = "type", default, skip_serializing_if = "Field::is_absent")]
    value_type: Field<TypeName>,
    #[serde(
        default,
        deserialize_with = "flag",
        skip_serializing_if = "Field::is_absent"
    )]
    required: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    default: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    env: Field<String>,
    #[serde(
        rename = "loadconfig",
        alias = "loadConfig",
        default,
        deserialize_with = "flag",
        skip_serializing_if = "Field::is_absent"
    )]
    load_config: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    help: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    format: Field<String>,
}

/// Type name as written in the definition, with its parsed meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
struct TypeName {
    declared: String,
    value_type: ValueType,
}

impl From<String> for TypeName {
    fn from(declared: String) -> Self {
        let value_type = ValueType::from_name(&declared);
        Self {
            declared,
            value_type,
        }
    }
}

impl From<ValueType> for TypeName {
    fn from(value_type: ValueType) -> Self {
        Self {
            declared: value_type.name().to_string(),
            value_type,
        }
    }
}

impl From<TypeName> for String {
    fn from(type_name: TypeName) -> Self {
        type_name.declared
    }
}

/// Reads a boolean flag, also accepting the YAML 1.1 words (`yes`, `off`, ...).
fn flag<'de, D>(deserializer: D) -> Result<Field<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Word(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(Field::Null),
        Some(Raw::Bool(b)) => Ok(Field::Set(b)),
        Some(Raw::Word(word)) => parse_yaml_bool(&word).map(Field::Set).ok_or_else(|| {
            de::Error::invalid_value(de::Unexpected::Str(&word), &"a boolean")
        }),
    }
}

impl ParamSpec {
    /// Creates an optional string parameter with the given `|`-separated
    /// alias string.
    pub fn new(name: impl Into<String>, cli: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cli: cli.into(),
            value_type: Field::Absent,
            required: Field::Absent,
            default: Field::Absent,
            env: Field::Absent,
            load_config: Field::Absent,
            help: Field::Absent,
            format: Field::Absent,
        }
    }

    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Field::Set(value_type.into());
        self
    }

    /// Marks the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = Field::Set(true);
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Field::Set(default.into());
        self
    }

    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Field::Set(env.into());
        self
    }

    /// Treats the resolved value as a config file path to load.
    pub fn load_config(mut self) -> Self {
        self.load_config = Field::Set(true);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Field::Set(help.into());
        self
    }

    /// Sets the `strftime`-style pattern used by datetime parameters.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Field::Set(format.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw alias string as declared.
    pub fn cli(&self) -> &str {
        &self.cli
    }

    /// Individual aliases in declaration order, trimmed, empty entries
    /// skipped.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.cli
            .split(ALIAS_SEPARATOR)
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
    }

    /// Declared type, `string` when omitted.
    pub fn value_type(&self) -> &ValueType {
        self.value_type
            .get()
            .map_or(&DEFAULT_TYPE, |type_name| &type_name.value_type)
    }

    pub fn is_required(&self) -> bool {
        self.required.get().copied().unwrap_or(false)
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.get()
    }

    pub fn env(&self) -> Option<&str> {
        self.env.get().map(String::as_str)
    }

    pub fn loads_config(&self) -> bool {
        self.load_config.get().copied().unwrap_or(false)
    }

    pub fn help(&self) -> Option<&str> {
        self.help.get().map(String::as_str)
    }

    pub fn format(&self) -> Option<&str> {
        self.format.get().map(String::as_str)
    }
}
