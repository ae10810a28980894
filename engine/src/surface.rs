//! CLI surface adapter.
//!
//! Translates a [`Schema`] into a `clap` [`Command`]: one argument per
//! parameter, registered under its aliases, grouped under a "Required
//! arguments" or "Optional arguments" help heading. `switch` parameters are
//! presence flags; every other type takes a single value coerced through the
//! type registry. Datetime values stay raw strings here, since they are parsed
//! only after precedence is settled.
//!
//! The adapter owns no resolution logic. Parsing yields [`CliValues`], the
//! per-parameter raw CLI tier consumed by the resolver.

use std::collections::HashMap;
use std::ffi::OsString;

use clap::{Arg, ArgAction, ArgMatches, Command};
use commandr_core::{ParamSpec, Schema, Value, ValueType, coerce};

/// Help heading for parameters declared `required`.
pub const REQUIRED_HEADING: &str = "Required arguments";
/// Help heading for all other parameters and the help flag.
pub const OPTIONAL_HEADING: &str = "Optional arguments";

/// Values found on the command line, keyed by parameter name.
///
/// Switch parameters always have an entry (`false` when the flag is absent);
/// other parameters only when given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliValues {
    values: HashMap<String, Value>,
}

impl CliValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Chaining form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Immutable parser configuration built from one schema.
///
/// # Examples
///
/// ```
/// use commandr::CliSurface;
/// use commandr_core::{ParamSpec, Schema, Value, ValueType};
///
/// let schema = Schema::new("demo")
///     .with_param(ParamSpec::new("count", "-c|--count").with_type(ValueType::Integer))
///     .and_then(|s| s.with_param(ParamSpec::new("debug", "-d|--debug").with_type(ValueType::Switch)))
///     .unwrap();
///
/// let surface = CliSurface::build(&schema);
/// let cli = surface.parse_from(["demo", "--count=3", "-d"]).unwrap();
/// assert_eq!(cli.get("count"), Some(&Value::Integer(3)));
/// assert_eq!(cli.get("debug"), Some(&Value::Bool(true)));
/// ```
#[derive(Debug, Clone)]
pub struct CliSurface {
    command: Command,
    /// Parameter names in schema order, flagged when registered as switches.
    params: Vec<(String, bool)>,
}

impl CliSurface {
    /// Registers every parameter of `schema`.
    ///
    /// Required parameters are registered first so their heading leads the
    /// help output. None are marked required at the clap level: a missing
    /// flag may still be supplied by the environment or a default.
    pub fn build(schema: &Schema) -> Self {
        let mut command = Command::new(schema.name().to_string()).disable_help_flag(true);

        match (schema.title(), schema.description()) {
            (Some(title), Some(description)) => {
                command = command
                    .about(title.to_string())
                    .long_about(format!("{title}\n\n{description}"));
            }
            (Some(about), None) | (None, Some(about)) => {
                command = command.about(about.to_string());
            }
            (None, None) => {}
        }
        let (required, optional): (Vec<&ParamSpec>, Vec<&ParamSpec>) =
            schema.params().iter().partition(|p| p.is_required());
        for spec in required.into_iter().chain(optional) {
            command = command.arg(register(spec));
        }

        command = command.arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .action(ArgAction::Help)
                .help("Print help")
                .help_heading(OPTIONAL_HEADING),
        );

        let params = schema
            .params()
            .iter()
            .map(|p| (p.name().to_string(), p.value_type().is_switch()))
            .collect();

        Self { command, params }
    }

    /// The underlying clap command.
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Renders the help text.
    pub fn render_help(&self) -> String {
        self.command.clone().render_help().to_string()
    }

    /// Parses `args`, whose first item is the program name.
    ///
    /// # Errors
    ///
    /// Returns the clap error for unknown flags, missing flag values, values
    /// that fail coercion, and `--help`/`--version` requests.
    pub fn parse_from<I, T>(&self, args: I) -> Result<CliValues, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command.clone().try_get_matches_from(args)?;
        Ok(self.extract(&matches))
    }

    fn extract(&self, matches: &ArgMatches) -> CliValues {
        let mut values = CliValues::new();
        for (name, is_switch) in &self.params {
            if *is_switch {
                values.insert(name.as_str(), matches.get_flag(name));
            } else if let Some(value) = matches.get_one::<Value>(name) {
                values.insert(name.as_str(), value.clone());
            }
        }
        values
    }
}

fn register(spec: &ParamSpec) -> Arg {
    let heading = if spec.is_required() {
        REQUIRED_HEADING
    } else {
        OPTIONAL_HEADING
    };
    let mut arg = Arg::new(spec.name().to_string()).help_heading(heading);
    if let Some(help) = spec.help() {
        arg = arg.help(help.to_string());
    }

    let mut has_long = false;
    let mut has_short = false;
    for alias in spec.aliases() {
        if let Some(long) = alias.strip_prefix("--") {
            arg = if has_long {
                arg.visible_alias(long.to_string())
            } else {
                arg.long(long.to_string())
            };
            has_long = true;
        } else if let Some(short) = alias.strip_prefix('-').and_then(|s| s.chars().next()) {
            arg = if has_short {
                arg.visible_short_alias(short)
            } else {
                arg.short(short)
            };
            has_short = true;
        }
    }

    if spec.value_type().is_switch() {
        return arg.action(ArgAction::SetTrue);
    }

    if matches!(spec.value_type(), ValueType::Integer | ValueType::Float) {
        arg = arg.allow_negative_numbers(true);
    }

    let value_type = match spec.value_type() {
        ValueType::DateTime => ValueType::String,
        other => other.clone(),
    };
    arg.action(ArgAction::Set)
        .value_name(spec.name().to_uppercase())
        .value_parser(move |raw: &str| coerce(&value_type, raw, None))
}
