//! Error types for config and definition file operations.
//!
//! Provides a unified error type covering I/O, JSON/YAML syntax, unsupported
//! file extensions, and schema definitions that fail validation.

use std::path::PathBuf;

use commandr_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading or saving files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File extension does not select a known format.
    #[error("unsupported config format for '{}' (expected .json, .yaml or .yml)", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Schema definition parsed but failed validation.
    #[error("invalid schema definition: {0}")]
    Schema(#[from] SchemaError),
}

impl LoadError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
