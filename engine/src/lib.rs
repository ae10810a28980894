//! Declarative parameter resolution from CLI flags, environment variables,
//! and defaults.
//!
//! A [`Schema`](commandr_core::Schema) declares each parameter once; this
//! crate turns it into a command-line surface and resolves every parameter
//! by fixed precedence (CLI > ENV > DEFAULT > absent), recording which tier
//! supplied each value. Parameters flagged `loadconfig` have their resolved
//! path loaded as a JSON or YAML payload.
//!
//! # Main entry points
//!
//! - [`Commandr`]: schema + CLI surface + resolver options in one value.
//! - [`CliSurface`]: builds the `clap` command and extracts raw CLI values.
//! - [`Resolver`]: the precedence algorithm over [`CliValues`] and an
//!   [`Environment`].
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//!
//! use commandr::Commandr;
//! use commandr_core::{ParamSpec, Schema, Source, Value, ValueType};
//!
//! let schema = Schema::new("demo")
//!     .with_param(
//!         ParamSpec::new("count", "-c|--count")
//!             .with_type(ValueType::Integer)
//!             .with_default(12345i64)
//!             .with_env("COUNT"),
//!     )
//!     .unwrap();
//! let app = Commandr::new(schema);
//!
//! let env: HashMap<String, String> = [("COUNT".into(), "7".into())].into();
//! let resolution = app.parse_from(["demo", "--count=3"], &env).unwrap();
//! assert_eq!(resolution.value("count"), Some(&Value::Integer(3)));
//! assert_eq!(resolution.source("count"), Some(Source::Cli));
//! ```

mod env;
mod error;
mod resolve;
mod surface;

use std::ffi::OsString;
use std::path::Path;

use commandr_core::Schema;
use commandr_loader::LoadError;

pub use env::{Environment, ProcessEnvironment};
pub use error::{ResolveError, Result};
pub use resolve::{
    ConfigPayload, OnMissingRequired, Resolution, ResolveOptions, ResolvedValue, Resolver,
    Validator,
};
pub use surface::{CliSurface, CliValues, OPTIONAL_HEADING, REQUIRED_HEADING};

/// A built schema together with its CLI surface and resolver options.
///
/// The schema is fixed once the surface is built; build a new `Commandr` to
/// change it.
#[derive(Debug)]
pub struct Commandr {
    schema: Schema,
    surface: CliSurface,
    options: ResolveOptions,
}

impl Commandr {
    /// Builds the CLI surface for `schema` with default options
    /// ([`OnMissingRequired::Raise`], no validators).
    pub fn new(schema: Schema) -> Self {
        let surface = CliSurface::build(&schema);
        Self {
            schema,
            surface,
            options: ResolveOptions::default(),
        }
    }

    /// Loads a schema definition file (`.json`, `.yaml` or `.yml`).
    ///
    /// # Errors
    ///
    /// Returns the [`LoadError`] from reading or validating the definition.
    pub fn from_file(path: impl AsRef<Path>) -> std::result::Result<Self, LoadError> {
        Ok(Self::new(commandr_loader::load_schema(path)?))
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn surface(&self) -> &CliSurface {
        &self.surface
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolves against the process arguments and environment.
    ///
    /// In [`OnMissingRequired::Terminate`] mode, command-line errors and help
    /// requests are reported by clap and end the process as well.
    ///
    /// # Errors
    ///
    /// See [`parse_from`](Self::parse_from).
    pub fn parse(&self) -> Result<Resolution> {
        self.parse_from(std::env::args_os(), &ProcessEnvironment)
    }

    /// Resolves against explicit arguments (first item is the program name)
    /// and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Cli`] for command-line errors, otherwise any
    /// error of [`Resolver::resolve`].
    pub fn parse_from<I, T>(&self, args: I, env: &dyn Environment) -> Result<Resolution>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let terminate = self.options.missing_required_mode() == OnMissingRequired::Terminate;

        let cli = match self.surface.parse_from(args) {
            Ok(cli) => cli,
            Err(err) if terminate => err.exit(),
            Err(err) => return Err(err.into()),
        };

        Resolver::new(&self.schema, &self.options)
            .with_usage(self.surface.render_help())
            .resolve(&cli, env)
    }
}
