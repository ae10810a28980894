//! Schema definition files.
//!
//! A definition is a [`SchemaDocument`] stored as JSON or YAML. Loading goes
//! through the same extension dispatch as config payloads, then rebuilds the
//! [`Schema`] so every construction check runs again.
//!
//! # Example YAML
//!
//! ```yaml
//! name: demo
//! title: Demo tool
//! schemaVersion: "1.0"
//! args:
//!   - name: count
//!     cli: -c|--count
//!     type: integer
//!     default: 12345
//!     env: COUNT
//!   - name: config
//!     cli: --config
//!     required: true
//!     loadconfig: true
//! ```

use std::path::Path;

use commandr_core::{Schema, SchemaDocument};
use tracing::debug;

use crate::error::Result;
use crate::loader::ConfigFormat;

/// Loads and validates a schema definition file.
///
/// # Errors
///
/// Returns [`UnsupportedFormat`](crate::LoadError::UnsupportedFormat) for
/// unknown extensions, I/O or parse errors, or
/// [`Schema`](crate::LoadError::Schema) when the definition violates a
/// construction invariant.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Schema> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let document: SchemaDocument = format.read(path)?;
    let schema = Schema::from_document(document)?;
    debug!(path = %path.display(), schema = schema.name(), params = schema.len(), "loaded schema definition");
    Ok(schema)
}

/// Writes a schema definition file in the format chosen by extension.
///
/// # Errors
///
/// Returns [`Schema`](crate::LoadError::Schema) for a schema that could not
/// be loaded back, [`UnsupportedFormat`](crate::LoadError::UnsupportedFormat)
/// for unknown extensions, or an I/O or serialization error.
pub fn save_schema(schema: &Schema, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    schema.validate()?;
    let format = ConfigFormat::from_path(path)?;
    format.write(path, &schema.to_document())
}
