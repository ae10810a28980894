//! Error types for resolution.
//!
//! Every variant aborts the whole resolution call; no partial results are
//! returned.

use commandr_core::CoercionError;
use commandr_loader::LoadError;
use thiserror::Error;

/// Errors that can occur while resolving a schema.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Command-line parsing failed (unknown flag, bad value, help request).
    #[error(transparent)]
    Cli(#[from] clap::Error),

    /// An environment or default value could not be converted to the
    /// parameter's type.
    #[error("{name}: {source}")]
    Coercion {
        name: String,
        #[source]
        source: CoercionError,
    },

    /// A required parameter had no CLI value, environment value, or default.
    #[error("{name} is a required argument, but it was not provided")]
    MissingRequired { name: String },

    /// The config file named by a load-config parameter could not be loaded.
    #[error("{name}: failed to load config: {source}")]
    Config {
        name: String,
        #[source]
        source: LoadError,
    },

    /// A post-resolution validator rejected the result.
    #[error("validation failed: {0}")]
    Validation(String),
}

/// Convenience alias for results with [`ResolveError`].
pub type Result<T> = std::result::Result<T, ResolveError>;
