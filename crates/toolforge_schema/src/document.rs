//! JSON documents for fields and schemas.
//!
//! Documents are flat: every constraint sits next to `kind`, and a
//! constraint that does not apply to the declared kind is an error rather
//! than silently ignored.
//!
//! ```json
//! {
//!   "name": "input",
//!   "fields": {
//!     "city": { "kind": "string", "required": true, "min_length": 1 },
//!     "days": { "kind": "integer", "min": 1, "max": 14, "default": 3 }
//!   }
//! }
//! ```

use crate::error::SchemaError;
use crate::field::{
    ArrayConstraints, EnumConstraints, FieldDefinition, FieldKind, FileConstraints,
    NumberConstraints, ObjectConstraints, Pattern, SecretConstraints, StringConstraints,
    StringFormat,
};
use crate::schema::Schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind tag of a field document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKindTag {
    /// String
    String,
    /// Number
    Number,
    /// Number with `integer_only` set
    Integer,
    /// Boolean
    Boolean,
    /// Date
    Date,
    /// Time of day
    Time,
    /// Date-time
    #[serde(alias = "date-time", alias = "date_time")]
    DateTime,
    /// Array
    Array,
    /// Object
    Object,
    /// Enum
    Enum,
    /// File descriptor
    File,
    /// Secret key
    #[serde(rename = "secret-key", alias = "secret_key", alias = "secret")]
    SecretKey,
}

impl FieldKindTag {
    const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Array => "array",
            Self::Object => "object",
            Self::Enum => "enum",
            Self::File => "file",
            Self::SecretKey => "secret-key",
        }
    }

    const fn required_by_default(self) -> bool {
        matches!(self, Self::SecretKey)
    }
}

/// Flat wire form of a [`FieldDefinition`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDocument {
    /// Field kind
    #[serde(alias = "type")]
    pub kind: FieldKindTag,
    /// Whether a value must be supplied; defaults to `true` for secret keys
    /// and `false` for every other kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Value used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// String and secret minimum length
    #[serde(default, alias = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// String maximum length
    #[serde(default, alias = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// String full-match pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// String named format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<StringFormat>,
    /// String allowed values
    #[serde(default, alias = "enumValues", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    /// Number inclusive minimum
    #[serde(default, alias = "minimum", skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Number inclusive maximum
    #[serde(default, alias = "maximum", skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Number rejects fractional values
    #[serde(default, alias = "integerOnly", skip_serializing_if = "Option::is_none")]
    pub integer_only: Option<bool>,

    /// Array element definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<FieldDocument>>,
    /// Array minimum element count
    #[serde(default, alias = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    /// Array maximum element count
    #[serde(default, alias = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,

    /// Object properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, FieldDocument>>,
    /// Object properties required regardless of their own flag
    #[serde(default, alias = "requiredProperties", skip_serializing_if = "Option::is_none")]
    pub required_properties: Option<Vec<String>>,
    /// Object rejects undeclared keys (default `true`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    /// Enum accepted values
    #[serde(default, alias = "enum", skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,

    /// File accepted MIME types
    #[serde(default, alias = "allowedMimeTypes", skip_serializing_if = "Option::is_none")]
    pub allowed_mime_types: Option<Vec<String>>,
    /// File maximum declared size
    #[serde(default, alias = "maxFileSizeBytes", skip_serializing_if = "Option::is_none")]
    pub max_file_size_bytes: Option<u64>,
}

impl FieldDocument {
    fn bare(kind: FieldKindTag, field: &FieldDefinition) -> Self {
        Self {
            kind,
            required: (field.is_required() != kind.required_by_default())
                .then_some(field.is_required()),
            default: field.default_value().cloned(),
            description: field.description().map(str::to_string),
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
            enum_values: None,
            min: None,
            max: None,
            integer_only: None,
            items: None,
            min_items: None,
            max_items: None,
            properties: None,
            required_properties: None,
            strict: None,
            values: None,
            allowed_mime_types: None,
            max_file_size_bytes: None,
        }
    }

    /// Names of the kind-specific constraints present in this document
    fn present_constraints(&self) -> Vec<&'static str> {
        let checks = [
            ("min_length", self.min_length.is_some()),
            ("max_length", self.max_length.is_some()),
            ("pattern", self.pattern.is_some()),
            ("format", self.format.is_some()),
            ("enum_values", self.enum_values.is_some()),
            ("min", self.min.is_some()),
            ("max", self.max.is_some()),
            ("integer_only", self.integer_only.is_some()),
            ("items", self.items.is_some()),
            ("min_items", self.min_items.is_some()),
            ("max_items", self.max_items.is_some()),
            ("properties", self.properties.is_some()),
            ("required_properties", self.required_properties.is_some()),
            ("strict", self.strict.is_some()),
            ("values", self.values.is_some()),
            ("allowed_mime_types", self.allowed_mime_types.is_some()),
            ("max_file_size_bytes", self.max_file_size_bytes.is_some()),
        ];
        checks
            .into_iter()
            .filter_map(|(name, present)| present.then_some(name))
            .collect()
    }

    fn only_allow(&self, allowed: &[&str]) -> Result<(), SchemaError> {
        match self
            .present_constraints()
            .into_iter()
            .find(|c| !allowed.contains(c))
        {
            Some(constraint) => Err(SchemaError::InapplicableConstraint {
                constraint,
                kind: self.kind.as_str(),
            }),
            None => Ok(()),
        }
    }
}

impl TryFrom<FieldDocument> for FieldDefinition {
    type Error = SchemaError;

    fn try_from(doc: FieldDocument) -> Result<Self, Self::Error> {
        let kind = match doc.kind {
            FieldKindTag::String => {
                doc.only_allow(&["min_length", "max_length", "pattern", "format", "enum_values"])?;
                FieldKind::String(StringConstraints {
                    min_length: doc.min_length,
                    max_length: doc.max_length,
                    pattern: doc.pattern.as_deref().map(Pattern::new).transpose()?,
                    format: doc.format,
                    enum_values: doc.enum_values.clone().unwrap_or_default(),
                })
            }
            FieldKindTag::Number => {
                doc.only_allow(&["min", "max", "integer_only"])?;
                FieldKind::Number(NumberConstraints {
                    min: doc.min,
                    max: doc.max,
                    integer_only: doc.integer_only.unwrap_or(false),
                })
            }
            FieldKindTag::Integer => {
                doc.only_allow(&["min", "max", "integer_only"])?;
                if doc.integer_only == Some(false) {
                    return Err(SchemaError::InapplicableConstraint {
                        constraint: "integer_only",
                        kind: "integer",
                    });
                }
                FieldKind::Number(NumberConstraints {
                    min: doc.min,
                    max: doc.max,
                    integer_only: true,
                })
            }
            FieldKindTag::Boolean => {
                doc.only_allow(&[])?;
                FieldKind::Boolean
            }
            FieldKindTag::Date => {
                doc.only_allow(&[])?;
                FieldKind::Date
            }
            FieldKindTag::Time => {
                doc.only_allow(&[])?;
                FieldKind::Time
            }
            FieldKindTag::DateTime => {
                doc.only_allow(&[])?;
                FieldKind::DateTime
            }
            FieldKindTag::Array => {
                doc.only_allow(&["items", "min_items", "max_items"])?;
                let items = doc.items.clone().ok_or_else(|| SchemaError::InvalidDocument {
                    reason: "array fields require items".to_string(),
                })?;
                let items = FieldDefinition::try_from(*items).map_err(|e| e.in_field("items"))?;
                FieldKind::Array(ArrayConstraints {
                    items: Box::new(items),
                    min_items: doc.min_items,
                    max_items: doc.max_items,
                })
            }
            FieldKindTag::Object => {
                doc.only_allow(&["properties", "required_properties", "strict"])?;
                let documents = doc.properties.clone().ok_or_else(|| SchemaError::InvalidDocument {
                    reason: "object fields require properties".to_string(),
                })?;
                let mut properties = IndexMap::with_capacity(documents.len());
                for (name, property) in documents {
                    let definition = FieldDefinition::try_from(property).map_err(|e| e.in_field(name.clone()))?;
                    properties.insert(name, definition);
                }
                FieldKind::Object(ObjectConstraints {
                    properties,
                    required_properties: doc.required_properties.clone().unwrap_or_default(),
                    strict: doc.strict.unwrap_or(true),
                })
            }
            FieldKindTag::Enum => {
                doc.only_allow(&["values"])?;
                FieldKind::Enum(EnumConstraints {
                    values: doc.values.clone().unwrap_or_default(),
                })
            }
            FieldKindTag::File => {
                doc.only_allow(&["allowed_mime_types", "max_file_size_bytes"])?;
                FieldKind::File(FileConstraints {
                    allowed_mime_types: doc
                        .allowed_mime_types
                        .clone()
                        .unwrap_or_default()
                        .into_iter()
                        .collect(),
                    max_file_size_bytes: doc.max_file_size_bytes,
                })
            }
            FieldKindTag::SecretKey => {
                doc.only_allow(&["min_length"])?;
                if doc.default.as_ref().is_some_and(|d| !d.is_null()) {
                    return Err(SchemaError::InapplicableConstraint {
                        constraint: "default",
                        kind: "secret-key",
                    });
                }
                FieldKind::SecretKey(SecretConstraints {
                    min_length: doc.min_length,
                })
            }
        };

        let required = doc.required.unwrap_or(doc.kind.required_by_default());
        Self::new(kind, required, doc.default, doc.description)
    }
}

impl From<&FieldDefinition> for FieldDocument {
    fn from(field: &FieldDefinition) -> Self {
        match field.kind() {
            FieldKind::String(c) => Self {
                min_length: c.min_length,
                max_length: c.max_length,
                pattern: c.pattern.as_ref().map(|p| p.as_str().to_string()),
                format: c.format,
                enum_values: (!c.enum_values.is_empty()).then(|| c.enum_values.clone()),
                ..Self::bare(FieldKindTag::String, field)
            },
            FieldKind::Number(c) => Self {
                min: c.min,
                max: c.max,
                ..Self::bare(
                    if c.integer_only {
                        FieldKindTag::Integer
                    } else {
                        FieldKindTag::Number
                    },
                    field,
                )
            },
            FieldKind::Boolean => Self::bare(FieldKindTag::Boolean, field),
            FieldKind::Date => Self::bare(FieldKindTag::Date, field),
            FieldKind::Time => Self::bare(FieldKindTag::Time, field),
            FieldKind::DateTime => Self::bare(FieldKindTag::DateTime, field),
            FieldKind::Array(c) => Self {
                items: Some(Box::new(Self::from(c.items.as_ref()))),
                min_items: c.min_items,
                max_items: c.max_items,
                ..Self::bare(FieldKindTag::Array, field)
            },
            FieldKind::Object(c) => Self {
                properties: Some(
                    c.properties
                        .iter()
                        .map(|(name, property)| (name.clone(), Self::from(property)))
                        .collect(),
                ),
                required_properties: (!c.required_properties.is_empty())
                    .then(|| c.required_properties.clone()),
                strict: (!c.strict).then_some(false),
                ..Self::bare(FieldKindTag::Object, field)
            },
            FieldKind::Enum(c) => Self {
                values: Some(c.values.clone()),
                ..Self::bare(FieldKindTag::Enum, field)
            },
            FieldKind::File(c) => Self {
                allowed_mime_types: (!c.allowed_mime_types.is_empty())
                    .then(|| c.allowed_mime_types.iter().cloned().collect()),
                max_file_size_bytes: c.max_file_size_bytes,
                ..Self::bare(FieldKindTag::File, field)
            },
            FieldKind::SecretKey(c) => Self {
                min_length: c.min_length,
                ..Self::bare(FieldKindTag::SecretKey, field)
            },
        }
    }
}

impl From<FieldDefinition> for FieldDocument {
    fn from(field: FieldDefinition) -> Self {
        Self::from(&field)
    }
}

fn default_schema_name() -> String {
    "schema".to_string()
}

fn default_strict() -> bool {
    true
}

/// Wire form of a [`Schema`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Schema name
    #[serde(default = "default_schema_name")]
    pub name: String,
    /// Reject undeclared top-level keys
    #[serde(default = "default_strict")]
    pub strict: bool,
    /// Fields in declaration order
    #[serde(default)]
    pub fields: IndexMap<String, FieldDocument>,
}

impl TryFrom<SchemaDocument> for Schema {
    type Error = SchemaError;

    fn try_from(doc: SchemaDocument) -> Result<Self, Self::Error> {
        let mut builder = Schema::builder(doc.name).strict(doc.strict);
        for (name, field) in doc.fields {
            let definition = FieldDefinition::try_from(field);
            builder = builder.try_field(name, definition);
        }
        builder.build()
    }
}

impl From<Schema> for SchemaDocument {
    fn from(schema: Schema) -> Self {
        Self::from(&schema)
    }
}

impl From<&Schema> for SchemaDocument {
    fn from(schema: &Schema) -> Self {
        Self {
            name: schema.name().to_string(),
            strict: schema.is_strict(),
            fields: schema
                .fields()
                .iter()
                .map(|(name, field)| (name.clone(), FieldDocument::from(field)))
                .collect(),
        }
    }
}

impl Schema {
    /// Parse a schema document from JSON text
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidDocument`] for malformed JSON or an
    /// unknown key, or any construction error for the fields themselves
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDocument =
            serde_json::from_str(text).map_err(|e| SchemaError::InvalidDocument {
                reason: e.to_string(),
            })?;
        Self::try_from(doc)
    }

    /// Parse a schema document from a JSON value
    ///
    /// # Errors
    ///
    /// Same as [`Schema::from_json_str`]
    pub fn from_json_value(value: Value) -> Result<Self, SchemaError> {
        let doc: SchemaDocument =
            serde_json::from_value(value).map_err(|e| SchemaError::InvalidDocument {
                reason: e.to_string(),
            })?;
        Self::try_from(doc)
    }

    /// Render the schema as a document
    #[must_use]
    pub fn to_document(&self) -> SchemaDocument {
        SchemaDocument::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ErrorCode;
    use serde_json::json;

    fn field_from(value: Value) -> Result<FieldDefinition, SchemaError> {
        let doc: FieldDocument = serde_json::from_value(value).unwrap();
        FieldDefinition::try_from(doc)
    }

    #[test]
    fn test_load_schema_document() {
        let schema = Schema::from_json_str(
            r#"{
                "name": "input",
                "fields": {
                    "city": {"kind": "string", "required": true, "minLength": 1},
                    "days": {"kind": "integer", "min": 1, "max": 14, "default": 3},
                    "units": {"kind": "enum", "values": ["metric", "imperial"], "default": "metric"}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(schema.name(), "input");
        assert_eq!(schema.len(), 3);

        let result = schema.validate(&json!({"city": "Oslo"}));
        assert!(result.valid);
        assert_eq!(
            result.normalized_value,
            json!({"city": "Oslo", "days": 3, "units": "metric"})
        );

        let result = schema.validate(&json!({"city": "Oslo", "days": 2.5}));
        assert_eq!(result.errors[0].code, ErrorCode::TypeMismatch);
    }

    #[test]
    fn test_inapplicable_constraint_rejected() {
        let err = field_from(json!({"kind": "number", "min_length": 3})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InapplicableConstraint {
                constraint: "min_length",
                kind: "number"
            }
        );
    }

    #[test]
    fn test_unknown_document_key_rejected() {
        let err = Schema::from_json_str(r#"{"fields": {"a": {"kind": "string", "minlen": 3}}}"#)
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDocument { .. }));
    }

    #[test]
    fn test_array_requires_items() {
        let err = field_from(json!({"kind": "array"})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDocument { .. }));
    }

    #[test]
    fn test_secret_default_rejected() {
        let err = field_from(json!({"kind": "secret-key", "default": "sk-123"})).unwrap_err();
        assert!(matches!(err, SchemaError::InapplicableConstraint { constraint: "default", .. }));
    }

    #[test]
    fn test_secret_key_required_unless_stated() {
        let key = field_from(json!({"kind": "secret-key"})).unwrap();
        assert!(key.is_required());
        let key = field_from(json!({"kind": "secret-key", "required": false})).unwrap();
        assert!(!key.is_required());
        assert_eq!(FieldDocument::from(&key).required, Some(false));
        let name = field_from(json!({"kind": "string"})).unwrap();
        assert!(!name.is_required());
    }

    #[test]
    fn test_nested_errors_name_their_path() {
        let err = Schema::from_json_str(
            r#"{"fields": {"user": {"kind": "object", "properties": {
                "age": {"kind": "number", "min": 5, "max": 1}
            }}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InField { ref field, .. } if field == "user.age"));
    }

    #[test]
    fn test_document_roundtrip_preserves_schema() {
        let text = r#"{
            "name": "config",
            "strict": false,
            "fields": {
                "api_key": {"kind": "secret-key", "min_length": 8},
                "tags": {"kind": "array", "items": {"kind": "string", "pattern": "[a-z]+"}, "max_items": 5},
                "upload": {"kind": "file", "allowed_mime_types": ["image/*"]},
                "when": {"kind": "datetime", "default": "2024-03-01T12:00:00+02:00"}
            }
        }"#;
        let schema = Schema::from_json_str(text).unwrap();
        let rendered = serde_json::to_value(&schema).unwrap();
        assert_eq!(rendered["fields"]["api_key"]["min_length"], json!(8));
        assert!(rendered["fields"]["tags"].get("required").is_none());
        assert_eq!(rendered["fields"]["when"]["default"], json!("2024-03-01T10:00:00Z"));
        let reloaded: Schema = serde_json::from_value(rendered).unwrap();
        assert_eq!(reloaded, schema);
    }
}
