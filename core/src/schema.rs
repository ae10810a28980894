//! Ordered parameter collections and their persisted form.
//!
//! [`Schema`] is the validated, ordered set of [`ParamSpec`]s consumed by the
//! CLI surface and the resolver. [`SchemaDocument`] is its serialization
//! shape (`{name, title, description, version, schemaVersion, args}`), stored
//! as JSON or YAML. Converting a document back into a schema re-runs every
//! construction check.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::validate::{SchemaError, validate_addition};
use crate::{Field, ParamSpec};

/// Version tag of the persisted definition format.
pub const SCHEMA_VERSION: &str = "1.0";

/// Serialized form of a [`Schema`].
///
/// Optional keys keep their absence or explicit `null`, and the format
/// version is kept under whichever key it was read from (`schemaVersion`, or
/// the legacy `schema_version`), so loading and saving a definition
/// reproduces it.
///
/// # Examples
///
/// ```
/// use commandr_core::{Schema, SchemaDocument};
///
/// let doc: SchemaDocument = serde_json::from_value(serde_json::json!({
///     "name": "demo",
///     "schemaVersion": "1.0",
///     "args": [
///         {"name": "count", "cli": "-c|--count", "type": "integer", "default": 12345, "env": "COUNT"}
///     ]
/// })).unwrap();
///
/// let schema = Schema::from_document(doc.clone()).unwrap();
/// assert_eq!(schema.len(), 1);
/// assert_eq!(schema.to_document(), doc);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub title: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub version: Field<String>,
    /// Definition format version.
    #[serde(
        rename = "schemaVersion",
        default,
        skip_serializing_if = "Field::is_absent"
    )]
    pub schema_version: Field<String>,
    /// Format version under its legacy key.
    #[serde(
        rename = "schema_version",
        default,
        skip_serializing_if = "Field::is_absent"
    )]
    pub legacy_schema_version: Field<String>,
    #[serde(default)]
    pub args: Vec<ParamSpec>,
}

impl SchemaDocument {
    /// The declared format version, from either key.
    pub fn declared_version(&self) -> Option<&str> {
        self.schema_version
            .get()
            .or_else(|| self.legacy_schema_version.get())
            .map(String::as_str)
    }
}

/// Validated, ordered collection of parameter specs plus metadata.
///
/// # Examples
///
/// ```
/// use commandr_core::{ParamSpec, Schema, SchemaError, ValueType};
///
/// let mut schema = Schema::new("demo").with_title("Demo tool");
/// schema.add(ParamSpec::new("count", "-c|--count").with_type(ValueType::Integer)).unwrap();
///
/// // Duplicate names are rejected and the schema is left as it was.
/// let err = schema.add(ParamSpec::new("count", "--total")).unwrap_err();
/// assert_eq!(err, SchemaError::DuplicateName("count".into()));
/// assert_eq!(schema.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    title: Field<String>,
    description: Field<String>,
    version: Field<String>,
    schema_version: Field<String>,
    legacy_schema_version: Field<String>,
    params: Vec<ParamSpec>,
}

impl Schema {
    /// Starts an empty schema stamped with [`SCHEMA_VERSION`].
    ///
    /// The name is checked by [`validate`](Self::validate), which every
    /// [`add`](Self::add) and every conversion to or from the persisted form
    /// runs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: Field::Absent,
            description: Field::Absent,
            version: Field::Absent,
            schema_version: Field::Set(SCHEMA_VERSION.to_string()),
            legacy_schema_version: Field::Absent,
            params: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Field::Set(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Field::Set(description.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Field::Set(version.into());
        self
    }

    /// Checks the schema-level invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptySchemaName`] for a blank name.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptySchemaName);
        }
        Ok(())
    }

    /// Appends a parameter after validating it against the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] describing the violated invariant; the schema
    /// is not modified.
    pub fn add(&mut self, spec: ParamSpec) -> Result<(), SchemaError> {
        self.validate()?;
        validate_addition(self, &spec)?;
        self.params.push(spec);
        Ok(())
    }

    /// Chaining form of [`add`](Self::add).
    pub fn with_param(mut self, spec: ParamSpec) -> Result<Self, SchemaError> {
        self.add(spec)?;
        Ok(self)
    }

    /// Format version this schema conforms to.
    pub fn schema_version(&self) -> &'static str {
        SCHEMA_VERSION
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.get().map(String::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.get().map(String::as_str)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.get().map(String::as_str)
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Looks up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Builds the persisted form.
    ///
    /// Schemas built in code carry `schemaVersion`; loaded schemas keep the
    /// version key (or its absence) they were read with.
    pub fn to_document(&self) -> SchemaDocument {
        SchemaDocument {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            schema_version: self.schema_version.clone(),
            legacy_schema_version: self.legacy_schema_version.clone(),
            args: self.params.clone(),
        }
    }

    /// Rebuilds a schema from its persisted form.
    ///
    /// A missing format version is read as the current one.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedSchemaVersion`] if either version key
    /// holds another version, [`SchemaError::EmptySchemaName`] for a blank
    /// name, or the first construction error among `args`.
    pub fn from_document(document: SchemaDocument) -> Result<Self, SchemaError> {
        let declared = [&document.schema_version, &document.legacy_schema_version];
        for version in declared.into_iter().filter_map(Field::get) {
            if version != SCHEMA_VERSION {
                return Err(SchemaError::UnsupportedSchemaVersion {
                    found: version.clone(),
                    supported: SCHEMA_VERSION,
                });
            }
        }
        if document.declared_version().is_none() {
            warn!(
                schema = %document.name,
                "definition has no schemaVersion, assuming {SCHEMA_VERSION}"
            );
        }

        let mut schema = Self {
            name: document.name,
            title: document.title,
            description: document.description,
            version: document.version,
            schema_version: document.schema_version,
            legacy_schema_version: document.legacy_schema_version,
            params: Vec::with_capacity(document.args.len()),
        };
        schema.validate()?;
        for spec in document.args {
            schema.add(spec)?;
        }
        Ok(schema)
    }

    /// Serializes into a generic JSON structure.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptySchemaName`] for a blank name, or
    /// [`SchemaError::Malformed`] if serialization fails.
    pub fn to_value(&self) -> Result<serde_json::Value, SchemaError> {
        self.validate()?;
        serde_json::to_value(self.to_document()).map_err(|e| SchemaError::Malformed(e.to_string()))
    }

    /// Deserializes from a generic JSON structure, re-running validation.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Malformed`] when the structure does not match
    /// the definition format, otherwise as [`from_document`](Self::from_document).
    pub fn from_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        let document: SchemaDocument =
            serde_json::from_value(value).map_err(|e| SchemaError::Malformed(e.to_string()))?;
        Self::from_document(document)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Value, ValueType};

    fn definition() -> serde_json::Value {
        json!({
            "name": "demo",
            "title": "Demo",
            "description": "Demo tool",
            "version": "0.3.1",
            "schemaVersion": "1.0",
            "args": [
                {"name": "count", "cli": "-c|--count", "type": "integer", "default": 12345, "env": "COUNT", "help": "Item count"},
                {"name": "config", "cli": "--config", "required": true, "loadconfig": true},
                {"name": "debug", "cli": "-d|--debug", "type": "switch", "env": "DEBUG"},
                {"name": "since", "cli": "--since", "type": "datetime", "format": "%Y-%m-%d", "default": "2022-01-01"},
                {"name": "ratio", "cli": "--ratio", "type": "float", "required": false, "default": 0.5}
            ]
        })
    }

    #[test]
    fn test_round_trip_is_exact() {
        let original = definition();
        let schema = Schema::from_value(original.clone()).unwrap();
        assert_eq!(schema.to_value().unwrap(), original);
    }

    #[test]
    fn test_from_value_preserves_order_and_types() {
        let schema = Schema::from_value(definition()).unwrap();
        let names: Vec<&str> = schema.params().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["count", "config", "debug", "since", "ratio"]);
        assert_eq!(
            schema.get("count").unwrap().default(),
            Some(&Value::Integer(12345))
        );
        assert_eq!(schema.get("debug").unwrap().value_type(), &ValueType::Switch);
        assert_eq!(schema.version(), Some("0.3.1"));
    }

    #[test]
    fn test_from_value_reruns_validation() {
        let mut bad = definition();
        bad["args"][1]["default"] = json!("app.yaml");
        assert_eq!(
            Schema::from_value(bad).unwrap_err(),
            SchemaError::RequiredWithDefault("config".to_string())
        );

        let mut dup = definition();
        dup["args"][4]["name"] = json!("count");
        assert_eq!(
            Schema::from_value(dup).unwrap_err(),
            SchemaError::DuplicateName("count".to_string())
        );
    }

    #[test]
    fn test_unknown_schema_version_rejected() {
        let mut future = definition();
        future["schemaVersion"] = json!("2.0");
        assert!(matches!(
            Schema::from_value(future),
            Err(SchemaError::UnsupportedSchemaVersion { .. })
        ));
    }

    #[test]
    fn test_legacy_documents_accepted() {
        let legacy = json!({
            "name": "legacy",
            "schema_version": "1.0",
            "args": [{"name": "path", "cli": "--path"}]
        });
        assert_eq!(Schema::from_value(legacy).unwrap().len(), 1);

        let unversioned = json!({"name": "legacy", "args": []});
        let schema = Schema::from_value(unversioned.clone()).unwrap();
        assert_eq!(schema.schema_version(), SCHEMA_VERSION);
        assert_eq!(schema.to_value().unwrap(), unversioned);

        let stale = json!({"name": "legacy", "schema_version": "0.9", "args": []});
        assert!(matches!(
            Schema::from_value(stale),
            Err(SchemaError::UnsupportedSchemaVersion { .. })
        ));
    }

    #[test]
    fn test_legacy_round_trip_is_exact() {
        let original = json!({
            "name": "demo",
            "title": null,
            "description": null,
            "version": null,
            "schema_version": "1.0",
            "args": [
                {
                    "name": "count",
                    "cli": "--count",
                    "type": "int",
                    "required": false,
                    "default": null,
                    "env": null,
                    "loadconfig": null,
                    "help": null,
                    "format": null
                },
                {"name": "strict", "cli": "--strict", "type": "bool", "default": true}
            ]
        });

        let schema = Schema::from_value(original.clone()).unwrap();
        assert_eq!(schema.title(), None);
        assert_eq!(schema.get("count").unwrap().value_type(), &ValueType::Integer);
        assert_eq!(schema.get("strict").unwrap().value_type(), &ValueType::Boolean);
        assert_eq!(schema.to_value().unwrap(), original);
        assert_eq!(Schema::from_document(schema.to_document()).unwrap(), schema);
    }

    #[test]
    fn test_empty_name_rejected_on_every_path() {
        let mut unnamed = Schema::new(" ");
        assert_eq!(
            unnamed.add(ParamSpec::new("count", "--count")),
            Err(SchemaError::EmptySchemaName)
        );
        assert_eq!(unnamed.to_value(), Err(SchemaError::EmptySchemaName));
        assert_eq!(
            Schema::from_value(json!({"name": "", "args": []})),
            Err(SchemaError::EmptySchemaName)
        );
    }

    #[test]
    fn test_malformed_definition() {
        let err = Schema::from_value(json!({"args": []})).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
    }

    #[test]
    fn test_explicit_and_loaded_schemas_are_equal() {
        let built = Schema::new("demo")
            .with_param(
                ParamSpec::new("count", "-c|--count")
                    .with_type(ValueType::Integer)
                    .with_default(12345i64)
                    .with_env("COUNT"),
            )
            .unwrap();
        let loaded = Schema::from_value(json!({
            "name": "demo",
            "schemaVersion": "1.0",
            "args": [{"name": "count", "cli": "-c|--count", "type": "integer", "default": 12345, "env": "COUNT"}]
        }))
        .unwrap();
        assert_eq!(built, loaded);
    }
}
