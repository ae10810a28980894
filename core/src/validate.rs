//! Construction-time validation of parameter specs.
//!
//! Every invariant is checked when a parameter enters a [`Schema`], whether
//! through [`Schema::add`] or by loading a definition, so a hand-edited file
//! fails exactly like a bad explicit call.
//!
//! # Examples
//!
//! ```
//! use commandr_core::*;
//!
//! let ok = ParamSpec::new("since", "--since")
//!     .with_type(ValueType::DateTime)
//!     .with_format("%Y-%m-%d");
//! assert!(validate_param(&ok).is_ok());
//!
//! // Datetime without a format
//! let bad = ParamSpec::new("since", "--since").with_type(ValueType::DateTime);
//! assert_eq!(
//!     validate_param(&bad),
//!     Err(SchemaError::DateTimeWithoutFormat("since".into())),
//! );
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::{ParamSpec, Schema, Value, ValueType};

/// Aliases claimed by the generated help flag.
pub const RESERVED_ALIASES: &[&str] = &["-h", "--help"];

/// Parameter names that collide with the generated help argument.
pub const RESERVED_NAMES: &[&str] = &["help"];

/// Schema definition errors.
///
/// Raised when a parameter or schema violates a construction invariant. The
/// schema being built is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Schema name is empty or whitespace-only.
    #[error("schema name cannot be empty")]
    EmptySchemaName,
    /// Parameter name is empty or whitespace-only.
    #[error("parameter name cannot be empty")]
    EmptyParamName,
    /// Parameter name collides with a generated argument.
    #[error("{0}: parameter name is reserved")]
    ReservedName(String),
    /// Two parameters share a name.
    #[error("duplicate parameter name: {0}")]
    DuplicateName(String),
    /// Required parameters resolve from CLI or ENV only.
    #[error("{0}: required parameters cannot have a default value")]
    RequiredWithDefault(String),
    /// Datetime parameters need a parse pattern.
    #[error("{0}: datetime parameters must specify a format")]
    DateTimeWithoutFormat(String),
    /// The `cli` field contains no aliases.
    #[error("{0}: at least one CLI alias is required")]
    MissingAlias(String),
    /// Alias is neither `-x` nor `--long`.
    #[error("{name}: invalid CLI alias '{alias}' (expected -x or --long-name)")]
    InvalidAlias { name: String, alias: String },
    /// Alias collides with the generated help flag.
    #[error("{name}: CLI alias '{alias}' is reserved")]
    ReservedAlias { name: String, alias: String },
    /// Alias already used by another parameter.
    #[error("{name}: CLI alias '{alias}' is already used by '{owner}'")]
    DuplicateAlias {
        name: String,
        alias: String,
        owner: String,
    },
    /// Default value does not fit the declared type.
    #[error("{name}: default of kind {found} does not match type '{expected}'")]
    DefaultTypeMismatch {
        name: String,
        expected: String,
        found: &'static str,
    },
    /// Default given as a parsed datetime instead of a string in the
    /// parameter's `format`.
    #[error("{0}: datetime defaults must be strings in the parameter's format")]
    ParsedDateTimeDefault(String),
    /// Definition declares a format version this build does not read.
    #[error("unsupported schema version '{found}' (supported: {supported})")]
    UnsupportedSchemaVersion {
        found: String,
        supported: &'static str,
    },
    /// Definition structure could not be decoded.
    #[error("malformed schema definition: {0}")]
    Malformed(String),
}

/// Checks the invariants of a single parameter in isolation.
///
/// # Errors
///
/// Returns the first violated invariant.
pub fn validate_param(spec: &ParamSpec) -> Result<(), SchemaError> {
    let name = spec.name();
    if name.trim().is_empty() {
        return Err(SchemaError::EmptyParamName);
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(SchemaError::ReservedName(name.to_string()));
    }
    if spec.is_required() && spec.default().is_some() {
        return Err(SchemaError::RequiredWithDefault(name.to_string()));
    }
    if *spec.value_type() == ValueType::DateTime && spec.format().is_none() {
        return Err(SchemaError::DateTimeWithoutFormat(name.to_string()));
    }

    validate_aliases(spec)?;

    if let Some(default) = spec.default() {
        validate_default(spec, default)?;
    }

    Ok(())
}

/// Checks `spec` against the parameters already present in `schema`.
///
/// # Errors
///
/// Returns [`SchemaError::DuplicateName`] or [`SchemaError::DuplicateAlias`]
/// on the first collision, after the checks of [`validate_param`].
pub fn validate_addition(schema: &Schema, spec: &ParamSpec) -> Result<(), SchemaError> {
    validate_param(spec)?;

    if schema.get(spec.name()).is_some() {
        return Err(SchemaError::DuplicateName(spec.name().to_string()));
    }

    let owners: HashMap<&str, &str> = schema
        .params()
        .iter()
        .flat_map(|existing| existing.aliases().map(move |alias| (alias, existing.name())))
        .collect();

    let mut own = Vec::new();
    for alias in spec.aliases() {
        if let Some(owner) = owners.get(alias) {
            return Err(SchemaError::DuplicateAlias {
                name: spec.name().to_string(),
                alias: alias.to_string(),
                owner: owner.to_string(),
            });
        }
        if own.contains(&alias) {
            return Err(SchemaError::DuplicateAlias {
                name: spec.name().to_string(),
                alias: alias.to_string(),
                owner: spec.name().to_string(),
            });
        }
        own.push(alias);
    }

    Ok(())
}

fn validate_aliases(spec: &ParamSpec) -> Result<(), SchemaError> {
    let name = spec.name();
    let mut count = 0usize;

    for alias in spec.aliases() {
        count += 1;

        if RESERVED_ALIASES.contains(&alias) {
            return Err(SchemaError::ReservedAlias {
                name: name.to_string(),
                alias: alias.to_string(),
            });
        }

        let well_formed = if let Some(long) = alias.strip_prefix("--") {
            !long.is_empty() && !long.starts_with('-') && !long.contains(char::is_whitespace)
        } else if let Some(short) = alias.strip_prefix('-') {
            let mut chars = short.chars();
            matches!((chars.next(), chars.next()), (Some(c), None) if c != '-' && !c.is_whitespace())
        } else {
            false
        };

        if !well_formed {
            return Err(SchemaError::InvalidAlias {
                name: name.to_string(),
                alias: alias.to_string(),
            });
        }
    }

    if count == 0 {
        return Err(SchemaError::MissingAlias(name.to_string()));
    }

    Ok(())
}

fn validate_default(spec: &ParamSpec, default: &Value) -> Result<(), SchemaError> {
    // Datetime defaults stay raw strings so they persist unchanged.
    if matches!(default, Value::DateTime(_)) {
        return Err(SchemaError::ParsedDateTimeDefault(spec.name().to_string()));
    }

    let value_type = spec.value_type();
    let fits = match value_type {
        ValueType::Integer => matches!(default, Value::Integer(_)),
        ValueType::Float => matches!(default, Value::Integer(_) | Value::Float(_)),
        ValueType::Boolean | ValueType::Switch => matches!(default, Value::Bool(_)),
        ValueType::DateTime => matches!(default, Value::String(_)),
        ValueType::String | ValueType::Other(_) => true,
    };

    if fits {
        Ok(())
    } else {
        Err(SchemaError::DefaultTypeMismatch {
            name: spec.name().to_string(),
            expected: value_type.name().to_string(),
            found: default.kind(),
        })
    }
}
