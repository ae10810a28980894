//! Config file dispatch by extension.
//!
//! [`load_config`] reads a file into a generic nested structure
//! ([`serde_json::Value`]), choosing the parser from the path's extension
//! alone: `.json` goes to `serde_json`, `.yaml`/`.yml` to `serde_yaml`.
//! Anything else is [`LoadError::UnsupportedFormat`]. Files are read fresh
//! on every call.
//!
//! YAML payloads follow YAML 1.1 boolean rules: scalar values `yes`, `no`,
//! `on` and `off` (and their capitalized forms) load as booleans, quoted or
//! not.
//!
//! ```no_run
//! use commandr_loader::load_config;
//!
//! let settings = load_config("settings.yaml").unwrap();
//! println!("{}", settings["database"]["host"]);
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use commandr_core::parse_yaml_bool;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{LoadError, Result};

/// File format selected by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Selects a format from the path's extension (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use commandr_loader::ConfigFormat;
    ///
    /// assert_eq!(ConfigFormat::from_path("app.json").unwrap(), ConfigFormat::Json);
    /// assert_eq!(ConfigFormat::from_path("app.YML").unwrap(), ConfigFormat::Yaml);
    /// assert!(ConfigFormat::from_path("app.txt").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedFormat`] for any other extension,
    /// including none.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Deserializes a value of type `T` from `path` in this format.
    pub(crate) fn read<T: DeserializeOwned>(self, path: &Path) -> Result<T> {
        let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
        let reader = BufReader::new(file);
        let value = match self {
            Self::Json => serde_json::from_reader(reader)?,
            Self::Yaml => serde_yaml::from_reader(reader)?,
        };
        Ok(value)
    }

    /// Serializes `value` to `path` in this format, replacing the file.
    pub(crate) fn write<T: Serialize + ?Sized>(self, path: &Path, value: &T) -> Result<()> {
        let file = File::create(path).map_err(|e| LoadError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        match self {
            Self::Json => {
                serde_json::to_writer_pretty(&mut writer, value)?;
                writer.write_all(b"\n").map_err(|e| LoadError::io(path, e))?;
            }
            Self::Yaml => serde_yaml::to_writer(&mut writer, value)?,
        }
        writer.flush().map_err(|e| LoadError::io(path, e))?;
        Ok(())
    }
}

/// Loads a config file into a nested structure.
///
/// # Errors
///
/// Returns [`LoadError::UnsupportedFormat`] before touching the filesystem
/// when the extension is not recognized, [`LoadError::Io`] if the file cannot
/// be read, or a JSON/YAML error if parsing fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<serde_json::Value> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "loading config file");
    let mut value = format.read(path)?;
    if format == ConfigFormat::Yaml {
        resolve_yaml_bools(&mut value);
    }
    Ok(value)
}

fn resolve_yaml_bools(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::String(word) => {
            if let Some(b) = parse_yaml_bool(word) {
                *value = serde_json::Value::Bool(b);
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(resolve_yaml_bools),
        serde_json::Value::Object(map) => map.values_mut().for_each(resolve_yaml_bools),
        _ => {}
    }
}

/// Writes any serializable value to a `.json` or `.yaml` file.
///
/// # Errors
///
/// Returns [`LoadError::UnsupportedFormat`] for unknown extensions,
/// [`LoadError::Io`] if the file cannot be written, or a serialization error.
pub fn save_config<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "saving config file");
    format.write(path, value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"db": {"host": "localhost", "port": 5432}}"#).unwrap();

        let value = load_config(&path).unwrap();
        assert_eq!(value, json!({"db": {"host": "localhost", "port": 5432}}));
    }

    #[test]
    fn test_load_yaml_nested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(
            &path,
            "db:\n  host: localhost\n  replicas:\n    - a\n    - b\nenabled: true\n",
        )
        .unwrap();

        let value = load_config(&path).unwrap();
        assert_eq!(
            value,
            json!({"db": {"host": "localhost", "replicas": ["a", "b"]}, "enabled": true})
        );
    }

    #[test]
    fn test_yaml_boolean_words() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flags.yaml");
        std::fs::write(
            &path,
            "enabled: yes\ncache: Off\nmodes: [on, NO, maybe]\nnested:\n  strict: ON\nname: yesterday\n",
        )
        .unwrap();

        assert_eq!(
            load_config(&path).unwrap(),
            json!({
                "enabled": true,
                "cache": false,
                "modes": [true, false, "maybe"],
                "nested": {"strict": true},
                "name": "yesterday"
            })
        );
    }

    #[test]
    fn test_json_strings_stay_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flags.json");
        std::fs::write(&path, r#"{"enabled": "yes"}"#).unwrap();
        assert_eq!(load_config(&path).unwrap(), json!({"enabled": "yes"}));
    }

    #[test]
    fn test_unsupported_extension_skips_io() {
        let err = load_config("/nonexistent/notes.txt").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config("/nonexistent/settings.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_config(&path), Err(LoadError::Json(_))));
    }

    #[test]
    fn test_save_then_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yml");
        let value = json!({"name": "demo", "items": [1, 2, 3]});

        save_config(&path, &value).unwrap();
        assert_eq!(load_config(&path).unwrap(), value);
    }

    #[test]
    fn test_reads_fresh_each_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.json");
        std::fs::write(&path, r#"{"v": 1}"#).unwrap();
        assert_eq!(load_config(&path).unwrap()["v"], 1);

        std::fs::write(&path, r#"{"v": 2}"#).unwrap();
        assert_eq!(load_config(&path).unwrap()["v"], 2);
    }
}
