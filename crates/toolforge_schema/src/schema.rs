//! Named, ordered collections of field definitions.

use crate::document::SchemaDocument;
use crate::error::SchemaError;
use crate::field::FieldDefinition;
use crate::validate::{ValidationResult, Validator};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input or config contract of a tool
///
/// Field order is declaration order and drives error order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDocument", into = "SchemaDocument")]
pub struct Schema {
    name: String,
    fields: IndexMap<String, FieldDefinition>,
    strict: bool,
}

impl Schema {
    /// Start building a strict schema
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Schema with no fields; strict, so it accepts only `{}`
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            strict: true,
        }
    }

    /// Schema with no fields that accepts any object as is
    #[must_use]
    pub fn permissive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            strict: false,
        }
    }

    pub(crate) fn from_parts(
        name: String,
        fields: IndexMap<String, FieldDefinition>,
        strict: bool,
    ) -> Self {
        Self {
            name,
            fields,
            strict,
        }
    }

    /// Schema name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    #[must_use]
    pub const fn fields(&self) -> &IndexMap<String, FieldDefinition> {
        &self.fields
    }

    /// Look up one field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Whether undeclared top-level keys are rejected
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Number of top-level fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether any field, at any depth, holds a secret
    #[must_use]
    pub fn contains_secret(&self) -> bool {
        self.fields.values().any(FieldDefinition::contains_secret)
    }

    /// Validate a payload with a default [`Validator`]
    #[must_use]
    pub fn validate(&self, raw: &Value) -> ValidationResult {
        Validator::new().validate(self, raw)
    }
}

/// Builder for [`Schema`]
///
/// Errors are deferred to [`SchemaBuilder::build`] so chains stay fluent.
/// The first error wins.
#[derive(Debug)]
#[must_use]
pub struct SchemaBuilder {
    name: String,
    fields: IndexMap<String, FieldDefinition>,
    strict: bool,
    error: Option<SchemaError>,
}

impl SchemaBuilder {
    /// Create a builder for a strict schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            strict: true,
            error: None,
        }
    }

    fn fail(&mut self, error: SchemaError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Declare a field
    pub fn field(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        let name = name.into();
        if name.is_empty() {
            self.fail(SchemaError::EmptyFieldName);
        } else if self.fields.contains_key(&name) {
            self.fail(SchemaError::DuplicateField { name });
        } else {
            self.fields.insert(name, definition);
        }
        self
    }

    /// Declare a field straight from a builder helper result
    ///
    /// A construction error is recorded against the field name.
    pub fn try_field(
        mut self,
        name: impl Into<String>,
        definition: Result<FieldDefinition, SchemaError>,
    ) -> Self {
        let name = name.into();
        match definition {
            Ok(definition) => self.field(name, definition),
            Err(e) => {
                self.fail(e.in_field(name));
                self
            }
        }
    }

    /// Reject (`true`, the default) or tolerate undeclared top-level keys
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Finish the schema
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] recorded while building
    pub fn build(self) -> Result<Schema, SchemaError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(Schema::from_parts(self.name, self.fields, self.strict)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::*;
    use serde_json::json;

    #[test]
    fn test_builder_keeps_declaration_order() {
        let schema = Schema::builder("input")
            .try_field("zeta", boolean_field(BasicOptions::default()))
            .try_field("alpha", string_field(StringOptions::default()))
            .build()
            .unwrap();
        let names: Vec<&str> = schema.fields().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(schema.name(), "input");
        assert!(schema.is_strict());
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let flag = boolean_field(BasicOptions::default()).unwrap();
        let err = Schema::builder("input")
            .field("flag", flag.clone())
            .field("flag", flag)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateField {
                name: "flag".to_string()
            }
        );
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let err = Schema::builder("input")
            .field("", boolean_field(BasicOptions::default()).unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::EmptyFieldName);
    }

    #[test]
    fn test_try_field_names_the_failing_field() {
        let err = Schema::builder("input")
            .try_field(
                "name",
                string_field(StringOptions {
                    min_length: Some(5),
                    max_length: Some(1),
                    ..StringOptions::default()
                }),
            )
            .try_field("status", enum_field(Vec::new(), BasicOptions::default()))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InField { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_non_strict_schema_copies_unknown_keys() {
        let schema = Schema::builder("config")
            .try_field("region", string_field(StringOptions::default()))
            .strict(false)
            .build()
            .unwrap();
        let result = schema.validate(&json!({"region": "eu", "extra": [1]}));
        assert!(result.valid);
        assert_eq!(result.normalized_value, json!({"region": "eu", "extra": [1]}));
    }

    #[test]
    fn test_empty_schema_accepts_only_empty_object() {
        let schema = Schema::empty("config");
        assert!(schema.is_empty());
        assert!(schema.validate(&json!({})).valid);
        assert!(!schema.validate(&json!({"x": 1})).valid);
    }

    #[test]
    fn test_permissive_schema_passes_objects_through() {
        let schema = Schema::permissive("input");
        let result = schema.validate(&json!({"anything": [1, 2], "nested": {"x": null}}));
        assert!(result.valid);
        assert_eq!(result.normalized_value, json!({"anything": [1, 2], "nested": {"x": null}}));
        assert!(!schema.validate(&json!("text")).valid);
    }

    #[test]
    fn test_contains_secret() {
        let schema = Schema::builder("config")
            .try_field("api_key", api_key_field(SecretOptions::default()))
            .build()
            .unwrap();
        assert!(schema.contains_secret());
        assert!(!Schema::empty("x").contains_secret());
    }
}
