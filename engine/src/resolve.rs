//! Precedence resolution.
//!
//! For each parameter, in schema order, the resolver picks the first tier
//! that has a value:
//!
//! 1. the CLI value, unless the parameter is a `switch` bound to an
//!    environment variable and its flag was not given;
//! 2. the environment variable named by `env`, coerced to the declared type;
//! 3. the schema default;
//! 4. nothing, which is an error for required parameters.
//!
//! Datetime parameters are parsed against their `format` only after the tier
//! is chosen. Load-config parameters then have their value read as a file
//! path through [`commandr_loader::load_config`].
//!
//! Resolution is all-or-nothing: the first failure aborts the call.

use std::collections::BTreeMap;
use std::fmt;

use commandr_core::{ParamSpec, Schema, Source, Value, ValueType, coerce};
use commandr_loader::load_config;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::env::Environment;
use crate::error::{ResolveError, Result};
use crate::surface::CliValues;

/// Config payloads keyed by the name of the parameter that pointed to them.
pub type ConfigPayload = BTreeMap<String, serde_json::Value>;

/// What to do when a required parameter resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnMissingRequired {
    /// Print the usage text and the error to stderr, then exit with status 1.
    Terminate,
    /// Return [`ResolveError::MissingRequired`] to the caller.
    #[default]
    Raise,
}

/// Post-resolution check over the complete result.
///
/// Validators run in registration order after every parameter has resolved;
/// the first `Err` aborts resolution with [`ResolveError::Validation`].
/// Closures of the matching signature implement this trait.
pub trait Validator {
    fn validate(&self, schema: &Schema, resolution: &Resolution) -> std::result::Result<(), String>;
}

impl<F> Validator for F
where
    F: Fn(&Schema, &Resolution) -> std::result::Result<(), String>,
{
    fn validate(&self, schema: &Schema, resolution: &Resolution) -> std::result::Result<(), String> {
        self(schema, resolution)
    }
}

/// Resolver configuration.
///
/// # Examples
///
/// ```
/// use commandr::{OnMissingRequired, ResolveOptions};
///
/// let options = ResolveOptions::new()
///     .on_missing_required(OnMissingRequired::Raise)
///     .with_validator(|_: &commandr_core::Schema, resolution: &commandr::Resolution| {
///         if resolution.len() > 100 {
///             return Err("too many parameters".to_string());
///         }
///         Ok(())
///     });
/// assert_eq!(options.missing_required_mode(), OnMissingRequired::Raise);
/// ```
#[derive(Default)]
pub struct ResolveOptions {
    on_missing_required: OnMissingRequired,
    validators: Vec<Box<dyn Validator + Send + Sync>>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_missing_required(mut self, mode: OnMissingRequired) -> Self {
        self.on_missing_required = mode;
        self
    }

    /// Appends a post-resolution validator.
    pub fn with_validator(mut self, validator: impl Validator + Send + Sync + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn missing_required_mode(&self) -> OnMissingRequired {
        self.on_missing_required
    }
}

impl fmt::Debug for ResolveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveOptions")
            .field("on_missing_required", &self.on_missing_required)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Resolved value of one parameter and the tier it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedValue {
    pub source: Source,
    pub value: Option<Value>,
}

/// Complete result of resolving a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    values: Vec<(String, ResolvedValue)>,
    configs: ConfigPayload,
}

impl Resolution {
    pub fn get(&self, name: &str) -> Option<&ResolvedValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, resolved)| resolved)
    }

    /// Resolved value of `name`, `None` when unknown or absent.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(|resolved| resolved.value.as_ref())
    }

    pub fn source(&self, name: &str) -> Option<Source> {
        self.get(name).map(|resolved| resolved.source)
    }

    /// Parameters in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedValue)> {
        self.values.iter().map(|(n, resolved)| (n.as_str(), resolved))
    }

    pub fn configs(&self) -> &ConfigPayload {
        &self.configs
    }

    pub fn config(&self, name: &str) -> Option<&serde_json::Value> {
        self.configs.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Renders `{name: value}`, or `{name: {source, value}}` with
    /// `include_source`.
    pub fn to_json(&self, include_source: bool) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        for (name, resolved) in &self.values {
            let entry = if include_source {
                json!({ "source": resolved.source, "value": resolved.value })
            } else {
                json!(resolved.value)
            };
            out.insert(name.clone(), entry);
        }
        serde_json::Value::Object(out)
    }
}

/// Applies the precedence rules to one schema.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
///
/// use commandr::{CliValues, ResolveOptions, Resolver};
/// use commandr_core::{ParamSpec, Schema, Source, Value, ValueType};
///
/// let schema = Schema::new("demo")
///     .with_param(
///         ParamSpec::new("count", "--count")
///             .with_type(ValueType::Integer)
///             .with_default(12345i64)
///             .with_env("COUNT"),
///     )
///     .unwrap();
/// let options = ResolveOptions::new();
/// let resolver = Resolver::new(&schema, &options);
///
/// let env: HashMap<String, String> = [("COUNT".into(), "7".into())].into();
/// let resolution = resolver.resolve(&CliValues::new(), &env).unwrap();
/// assert_eq!(resolution.value("count"), Some(&Value::Integer(7)));
/// assert_eq!(resolution.source("count"), Some(Source::Env));
/// ```
#[derive(Debug)]
pub struct Resolver<'a> {
    schema: &'a Schema,
    options: &'a ResolveOptions,
    usage: Option<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(schema: &'a Schema, options: &'a ResolveOptions) -> Self {
        Self {
            schema,
            options,
            usage: None,
        }
    }

    /// Usage text printed before exiting in [`OnMissingRequired::Terminate`]
    /// mode.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Resolves every parameter of the schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`ResolveError`] encountered. In
    /// [`OnMissingRequired::Terminate`] mode a missing required value exits
    /// the process instead.
    pub fn resolve(&self, cli: &CliValues, env: &dyn Environment) -> Result<Resolution> {
        let mut resolution = Resolution {
            values: Vec::with_capacity(self.schema.len()),
            configs: ConfigPayload::new(),
        };

        for spec in self.schema.params() {
            let resolved = self.resolve_param(spec, cli, env)?;

            if spec.loads_config() {
                if let Some(path) = &resolved.value {
                    let path = path.to_string();
                    debug!(param = spec.name(), %path, "loading config for parameter");
                    let payload = load_config(&path).map_err(|source| ResolveError::Config {
                        name: spec.name().to_string(),
                        source,
                    })?;
                    resolution.configs.insert(spec.name().to_string(), payload);
                }
            }

            resolution.values.push((spec.name().to_string(), resolved));
        }

        for validator in &self.options.validators {
            validator
                .validate(self.schema, &resolution)
                .map_err(ResolveError::Validation)?;
        }

        Ok(resolution)
    }

    fn resolve_param(
        &self,
        spec: &ParamSpec,
        cli: &CliValues,
        env: &dyn Environment,
    ) -> Result<ResolvedValue> {
        let name = spec.name();
        let value_type = spec.value_type();
        let cli_value = cli.get(name);
        let env_value = spec.env().and_then(|key| env.var(key));

        debug!(
            param = name,
            cli = ?cli_value,
            env = ?env_value,
            default = ?spec.default(),
            required = spec.is_required(),
            load_config = spec.loads_config(),
            "resolving parameter"
        );

        // An unset flag on an env-bound switch must not shadow the variable.
        let deferred_switch = value_type.is_switch()
            && spec.env().is_some()
            && matches!(cli_value, Some(Value::Bool(false)));

        let (value, source) = match (cli_value, env_value, spec.default()) {
            (Some(value), _, _) if !deferred_switch => (Some(value.clone()), Source::Cli),
            (_, Some(raw), _) => (Some(coerce_env(spec, &raw)?), Source::Env),
            (_, None, Some(default)) => (Some(widen_default(value_type, default)), Source::Default),
            (_, None, None) => {
                if spec.is_required() {
                    return Err(self.missing_required(name));
                }
                (None, Source::None)
            }
        };

        let value = match value {
            Some(Value::String(raw)) if *value_type == ValueType::DateTime => Some(
                coerce(value_type, &raw, spec.format()).map_err(|source| {
                    ResolveError::Coercion {
                        name: name.to_string(),
                        source,
                    }
                })?,
            ),
            other => other,
        };

        debug!(param = name, %source, value = ?value, "resolved parameter");
        Ok(ResolvedValue { source, value })
    }

    fn missing_required(&self, name: &str) -> ResolveError {
        let err = ResolveError::MissingRequired {
            name: name.to_string(),
        };
        if self.options.on_missing_required == OnMissingRequired::Terminate {
            if let Some(usage) = &self.usage {
                eprintln!("{usage}");
            }
            eprintln!("error: {err}");
            std::process::exit(1);
        }
        err
    }
}

/// Coerces an environment value. Datetime values stay raw until precedence
/// is settled.
fn coerce_env(spec: &ParamSpec, raw: &str) -> Result<Value> {
    if *spec.value_type() == ValueType::DateTime {
        return Ok(Value::String(raw.to_string()));
    }
    coerce(spec.value_type(), raw, None).map_err(|source| ResolveError::Coercion {
        name: spec.name().to_string(),
        source,
    })
}

fn widen_default(value_type: &ValueType, default: &Value) -> Value {
    match (value_type, default) {
        (ValueType::Float, Value::Integer(i)) => Value::Float(*i as f64),
        _ => default.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use commandr_core::CoercionError;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn count_schema(required: bool) -> Schema {
        let mut spec = ParamSpec::new("count", "-c|--count")
            .with_type(ValueType::Integer)
            .with_env("COUNT");
        spec = if required {
            spec.required()
        } else {
            spec.with_default(12345i64)
        };
        Schema::new("demo").with_param(spec).unwrap()
    }

    fn resolve(schema: &Schema, cli: &CliValues, env: &HashMap<String, String>) -> Result<Resolution> {
        let options = ResolveOptions::new();
        Resolver::new(schema, &options).resolve(cli, env)
    }

    #[test]
    fn test_precedence_tiers() {
        let schema = count_schema(false);
        let cli = CliValues::new().with("count", 3i64);
        let set = env(&[("COUNT", "7")]);

        let r = resolve(&schema, &cli, &set).unwrap();
        assert_eq!(r.get("count").unwrap().value, Some(Value::Integer(3)));
        assert_eq!(r.source("count"), Some(Source::Cli));

        let r = resolve(&schema, &CliValues::new(), &set).unwrap();
        assert_eq!(r.value("count"), Some(&Value::Integer(7)));
        assert_eq!(r.source("count"), Some(Source::Env));

        let r = resolve(&schema, &CliValues::new(), &env(&[])).unwrap();
        assert_eq!(r.value("count"), Some(&Value::Integer(12345)));
        assert_eq!(r.source("count"), Some(Source::Default));
    }

    #[test]
    fn test_absent_optional_is_none() {
        let schema = Schema::new("demo")
            .with_param(ParamSpec::new("name", "--name").with_env("NAME"))
            .unwrap();
        let r = resolve(&schema, &CliValues::new(), &env(&[])).unwrap();
        assert_eq!(r.get("name").unwrap(), &ResolvedValue {
            source: Source::None,
            value: None,
        });
    }

    #[test]
    fn test_missing_required_raises() {
        let schema = count_schema(true);
        let err = resolve(&schema, &CliValues::new(), &env(&[])).unwrap_err();
        assert!(matches!(err, ResolveError::MissingRequired { ref name } if name == "count"));
    }

    #[test]
    fn test_required_satisfied_by_env() {
        let schema = count_schema(true);
        let r = resolve(&schema, &CliValues::new(), &env(&[("COUNT", "1")])).unwrap();
        assert_eq!(r.source("count"), Some(Source::Env));
    }

    #[test]
    fn test_env_coercion_failure() {
        let schema = count_schema(false);
        let err = resolve(&schema, &CliValues::new(), &env(&[("COUNT", "lots")])).unwrap_err();
        match err {
            ResolveError::Coercion { name, source } => {
                assert_eq!(name, "count");
                assert!(matches!(source, CoercionError::InvalidInteger { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn switch_schema() -> Schema {
        Schema::new("demo")
            .with_param(
                ParamSpec::new("debug", "-d|--debug")
                    .with_type(ValueType::Switch)
                    .with_env("DEBUG"),
            )
            .unwrap()
    }

    #[test]
    fn test_env_bound_switch_defers_to_env() {
        let schema = switch_schema();
        let absent = CliValues::new().with("debug", false);

        let r = resolve(&schema, &absent, &env(&[("DEBUG", "yes")])).unwrap();
        assert_eq!(r.value("debug"), Some(&Value::Bool(true)));
        assert_eq!(r.source("debug"), Some(Source::Env));

        let present = CliValues::new().with("debug", true);
        let r = resolve(&schema, &present, &env(&[("DEBUG", "yes")])).unwrap();
        assert_eq!(r.value("debug"), Some(&Value::Bool(true)));
        assert_eq!(r.source("debug"), Some(Source::Cli));
    }

    #[test]
    fn test_env_bound_switch_without_env_or_default() {
        let schema = switch_schema();
        let r = resolve(&schema, &CliValues::new().with("debug", false), &env(&[])).unwrap();
        assert_eq!(r.source("debug"), Some(Source::None));
        assert_eq!(r.value("debug"), None);
    }

    #[test]
    fn test_plain_switch_false_counts_as_cli() {
        let schema = Schema::new("demo")
            .with_param(ParamSpec::new("quiet", "-q").with_type(ValueType::Switch))
            .unwrap();
        let r = resolve(&schema, &CliValues::new().with("quiet", false), &env(&[])).unwrap();
        assert_eq!(r.value("quiet"), Some(&Value::Bool(false)));
        assert_eq!(r.source("quiet"), Some(Source::Cli));
    }

    #[test]
    fn test_datetime_parsed_after_precedence() {
        let schema = Schema::new("demo")
            .with_param(
                ParamSpec::new("since", "--since")
                    .with_type(ValueType::DateTime)
                    .with_format("%Y-%m-%d")
                    .with_env("SINCE")
                    .with_default("2020-01-01"),
            )
            .unwrap();
        let expected = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

        let r = resolve(&schema, &CliValues::new().with("since", "2022-05-12"), &env(&[])).unwrap();
        assert_eq!(r.value("since").unwrap().as_datetime().unwrap().date(), expected(2022, 5, 12));

        let r = resolve(&schema, &CliValues::new(), &env(&[("SINCE", "2021-02-03")])).unwrap();
        assert_eq!(r.value("since").unwrap().as_datetime().unwrap().date(), expected(2021, 2, 3));

        let r = resolve(&schema, &CliValues::new(), &env(&[])).unwrap();
        assert_eq!(r.value("since").unwrap().as_datetime().unwrap().date(), expected(2020, 1, 1));

        let err = resolve(&schema, &CliValues::new().with("since", "2022-13-40"), &env(&[])).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Coercion { source: CoercionError::InvalidDateTime { .. }, .. }
        ));
    }

    #[test]
    fn test_float_default_widens() {
        let schema = Schema::new("demo")
            .with_param(
                ParamSpec::new("ratio", "--ratio")
                    .with_type(ValueType::Float)
                    .with_default(2i64),
            )
            .unwrap();
        let r = resolve(&schema, &CliValues::new(), &env(&[])).unwrap();
        assert_eq!(r.value("ratio"), Some(&Value::Float(2.0)));
    }

    #[test]
    fn test_load_config_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"db": {"port": 5432}}"#).unwrap();

        let schema = Schema::new("demo")
            .with_param(ParamSpec::new("config", "--config").load_config())
            .unwrap();
        let cli = CliValues::new().with("config", path.to_string_lossy().to_string());
        let r = resolve(&schema, &cli, &env(&[])).unwrap();
        assert_eq!(r.config("config"), Some(&json!({"db": {"port": 5432}})));
    }

    #[test]
    fn test_load_config_unsupported_format() {
        let schema = Schema::new("demo")
            .with_param(ParamSpec::new("config", "--config").load_config())
            .unwrap();
        let cli = CliValues::new().with("config", "notes.txt");
        let err = resolve(&schema, &cli, &env(&[])).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Config { source: commandr_loader::LoadError::UnsupportedFormat { .. }, .. }
        ));
    }

    #[test]
    fn test_load_config_skipped_when_absent() {
        let schema = Schema::new("demo")
            .with_param(ParamSpec::new("config", "--config").load_config())
            .unwrap();
        let r = resolve(&schema, &CliValues::new(), &env(&[])).unwrap();
        assert!(r.configs().is_empty());
    }

    #[test]
    fn test_validator_runs_after_resolution() {
        let schema = count_schema(false);
        let options = ResolveOptions::new().with_validator(|_: &Schema, r: &Resolution| {
            match r.value("count").and_then(Value::as_i64) {
                Some(n) if n > 100 => Err(format!("count {n} exceeds 100")),
                _ => Ok(()),
            }
        });
        let resolver = Resolver::new(&schema, &options);

        let err = resolver.resolve(&CliValues::new(), &env(&[])).unwrap_err();
        assert!(matches!(err, ResolveError::Validation(ref msg) if msg == "count 12345 exceeds 100"));

        assert!(resolver
            .resolve(&CliValues::new().with("count", 5i64), &env(&[]))
            .is_ok());
    }

    #[test]
    fn test_to_json_shapes() {
        let schema = count_schema(false);
        let r = resolve(&schema, &CliValues::new(), &env(&[])).unwrap();
        assert_eq!(r.to_json(false), json!({"count": 12345}));
        assert_eq!(
            r.to_json(true),
            json!({"count": {"source": "DEFAULT", "value": 12345}})
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let schema = count_schema(false);
        let set = env(&[("COUNT", "7")]);
        assert_eq!(
            resolve(&schema, &CliValues::new(), &set).unwrap(),
            resolve(&schema, &CliValues::new(), &set).unwrap()
        );
    }
}
