//! File loading for parameter resolution.
//!
//! This crate is the config file dispatcher: it picks a JSON or YAML reader
//! from a path's extension and returns a nested structure, and it persists
//! schema definitions in the same two formats.
//!
//! # Quick start
//!
//! ```no_run
//! use commandr_loader::{load_config, load_schema, save_schema};
//!
//! // Load and validate a schema definition
//! let schema = load_schema("demo.cmdr.yaml").unwrap();
//!
//! // Convert it to JSON
//! save_schema(&schema, "demo.cmdr.json").unwrap();
//!
//! // Load a config payload
//! let payload = load_config("settings.json").unwrap();
//! ```

mod definition;
mod error;
mod loader;

pub use definition::{load_schema, save_schema};
pub use error::{LoadError, Result};
pub use loader::{ConfigFormat, load_config, save_config};
