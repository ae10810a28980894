//! Core types for declarative parameter resolution.
//!
//! This crate defines the pieces every other layer builds on:
//!
//! - [`ValueType`] / [`Value`]: declared parameter types and typed values.
//! - [`coerce`]: the type coercion registry (raw string → typed value).
//! - [`ParamSpec`]: one parameter with its aliases, env var, default and type.
//! - [`Schema`]: an ordered, validated collection of parameter specs, with
//!   [`SchemaDocument`] as its persisted JSON/YAML form.
//!
//! Validation ([`validate_param`], [`Schema::add`]) enforces construction
//! invariants such as "required parameters have no default" and "datetime
//! parameters declare a format" before anything is resolved.
//!
//! # Example
//!
//! ```
//! use commandr_core::*;
//!
//! let mut schema = Schema::new("demo").with_description("Demo tool");
//! schema
//!     .add(
//!         ParamSpec::new("count", "-c|--count")
//!             .with_type(ValueType::Integer)
//!             .with_default(12345i64)
//!             .with_env("COUNT"),
//!     )
//!     .unwrap();
//! schema
//!     .add(ParamSpec::new("debug", "-d|--debug").with_type(ValueType::Switch))
//!     .unwrap();
//!
//! assert_eq!(schema.len(), 2);
//! assert!(schema.add(ParamSpec::new("bad", "--bad").required().with_default("x")).is_err());
//!
//! let round_tripped = Schema::from_document(schema.to_document()).unwrap();
//! assert_eq!(round_tripped, schema);
//! ```

mod coerce;
mod schema;
mod spec;
mod types;
mod validate;

pub use coerce::{
    CoercionError, Coercer, coerce, coercer_for, parse_bool, parse_datetime, parse_yaml_bool,
};
pub use schema::{SCHEMA_VERSION, Schema, SchemaDocument};
pub use spec::{ALIAS_SEPARATOR, ParamSpec};
pub use types::{Field, Source, Value, ValueType};
pub use validate::{
    RESERVED_ALIASES, RESERVED_NAMES, SchemaError, validate_addition, validate_param,
};
