//! Helpers for declaring fields.
//!
//! Each helper takes an options struct meant to be written with
//! `..Default::default()` and returns a checked [`FieldDefinition`].
//!
//! ```
//! use toolforge_schema::builders::{number_field, NumberOptions};
//!
//! let count = number_field(NumberOptions {
//!     required: true,
//!     min: Some(1.0),
//!     max: Some(10.0),
//!     ..NumberOptions::default()
//! })
//! .unwrap();
//! assert!(count.is_required());
//! ```

use crate::error::SchemaError;
use crate::field::{
    ArrayConstraints, EnumConstraints, FieldDefinition, FieldKind, FileConstraints,
    NumberConstraints, ObjectConstraints, Pattern, SecretConstraints, StringConstraints,
    StringFormat,
};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

/// Options shared by kinds without constraints of their own
#[derive(Debug, Clone, Default)]
pub struct BasicOptions {
    /// Whether a value must be supplied
    pub required: bool,
    /// Value used when absent
    pub default: Option<Value>,
    /// Human-readable description
    pub description: Option<String>,
}

/// Options for [`string_field`]
#[derive(Debug, Clone, Default)]
pub struct StringOptions {
    /// Whether a value must be supplied
    pub required: bool,
    /// Value used when absent
    pub default: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
    /// Minimum length in characters
    pub min_length: Option<usize>,
    /// Maximum length in characters
    pub max_length: Option<usize>,
    /// Full-match regular expression
    pub pattern: Option<String>,
    /// Named format
    pub format: Option<StringFormat>,
    /// Allowed values
    pub enum_values: Vec<String>,
}

/// Options for [`number_field`] and [`integer_field`]
#[derive(Debug, Clone, Default)]
pub struct NumberOptions {
    /// Whether a value must be supplied
    pub required: bool,
    /// Value used when absent
    pub default: Option<Number>,
    /// Human-readable description
    pub description: Option<String>,
    /// Inclusive minimum
    pub min: Option<f64>,
    /// Inclusive maximum
    pub max: Option<f64>,
}

/// Options for [`array_field`]
#[derive(Debug, Clone, Default)]
pub struct ArrayOptions {
    /// Whether a value must be supplied
    pub required: bool,
    /// Value used when absent
    pub default: Option<Vec<Value>>,
    /// Human-readable description
    pub description: Option<String>,
    /// Minimum element count
    pub min_items: Option<usize>,
    /// Maximum element count
    pub max_items: Option<usize>,
}

/// Options for [`object_field`]
#[derive(Debug, Clone, Default)]
pub struct ObjectOptions {
    /// Whether a value must be supplied
    pub required: bool,
    /// Value used when absent
    pub default: Option<Map<String, Value>>,
    /// Human-readable description
    pub description: Option<String>,
    /// Properties required regardless of their own flag
    pub required_properties: Vec<String>,
    /// Copy undeclared keys through instead of rejecting them
    pub allow_unknown: bool,
}

/// Options for [`file_field`]
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    /// Whether a value must be supplied
    pub required: bool,
    /// Human-readable description
    pub description: Option<String>,
    /// Accepted MIME types; `image/*` style wildcards allowed
    pub allowed_mime_types: Vec<String>,
    /// Maximum declared size in bytes
    pub max_file_size_bytes: Option<u64>,
}

/// Options for [`secret_field`] and [`api_key_field`]
///
/// Secrets are required unless stated otherwise, and take no default.
#[derive(Debug, Clone)]
pub struct SecretOptions {
    /// Whether a value must be supplied
    pub required: bool,
    /// Human-readable description
    pub description: Option<String>,
    /// Minimum length in characters
    pub min_length: Option<usize>,
}

impl Default for SecretOptions {
    fn default() -> Self {
        Self {
            required: true,
            description: None,
            min_length: None,
        }
    }
}

/// String field
///
/// # Errors
///
/// Returns a [`SchemaError`] for inverted bounds, a bad pattern, or a
/// default that violates the constraints
pub fn string_field(options: StringOptions) -> Result<FieldDefinition, SchemaError> {
    let pattern = options.pattern.as_deref().map(Pattern::new).transpose()?;
    let kind = FieldKind::String(StringConstraints {
        min_length: options.min_length,
        max_length: options.max_length,
        pattern,
        format: options.format,
        enum_values: options.enum_values,
    });
    FieldDefinition::new(
        kind,
        options.required,
        options.default.map(Value::String),
        options.description,
    )
}

fn numeric(options: NumberOptions, integer_only: bool) -> Result<FieldDefinition, SchemaError> {
    let kind = FieldKind::Number(NumberConstraints {
        min: options.min,
        max: options.max,
        integer_only,
    });
    FieldDefinition::new(
        kind,
        options.required,
        options.default.map(Value::Number),
        options.description,
    )
}

/// Number field
///
/// # Errors
///
/// Returns a [`SchemaError`] for non-finite or inverted bounds, or a bad default
pub fn number_field(options: NumberOptions) -> Result<FieldDefinition, SchemaError> {
    numeric(options, false)
}

/// Number field that rejects fractional values
///
/// # Errors
///
/// Returns a [`SchemaError`] for non-finite or inverted bounds, or a bad default
pub fn integer_field(options: NumberOptions) -> Result<FieldDefinition, SchemaError> {
    numeric(options, true)
}

fn basic(kind: FieldKind, options: BasicOptions) -> Result<FieldDefinition, SchemaError> {
    FieldDefinition::new(kind, options.required, options.default, options.description)
}

/// Boolean field
///
/// # Errors
///
/// Returns [`SchemaError::InvalidDefault`] if the default is not a boolean
pub fn boolean_field(options: BasicOptions) -> Result<FieldDefinition, SchemaError> {
    basic(FieldKind::Boolean, options)
}

/// `YYYY-MM-DD` date field
///
/// # Errors
///
/// Returns [`SchemaError::InvalidDefault`] if the default is not a valid date
pub fn date_field(options: BasicOptions) -> Result<FieldDefinition, SchemaError> {
    basic(FieldKind::Date, options)
}

/// `HH:MM[:SS]` time field
///
/// # Errors
///
/// Returns [`SchemaError::InvalidDefault`] if the default is not a valid time
pub fn time_field(options: BasicOptions) -> Result<FieldDefinition, SchemaError> {
    basic(FieldKind::Time, options)
}

/// ISO-8601 date-time field
///
/// # Errors
///
/// Returns [`SchemaError::InvalidDefault`] if the default is not a valid date-time
pub fn datetime_field(options: BasicOptions) -> Result<FieldDefinition, SchemaError> {
    basic(FieldKind::DateTime, options)
}

/// Array whose elements all satisfy `items`
///
/// # Errors
///
/// Returns a [`SchemaError`] for inverted item bounds or a bad default
pub fn array_field(
    items: FieldDefinition,
    options: ArrayOptions,
) -> Result<FieldDefinition, SchemaError> {
    let kind = FieldKind::Array(ArrayConstraints {
        items: Box::new(items),
        min_items: options.min_items,
        max_items: options.max_items,
    });
    FieldDefinition::new(
        kind,
        options.required,
        options.default.map(Value::Array),
        options.description,
    )
}

/// Nested object with its own properties
///
/// # Errors
///
/// Returns a [`SchemaError`] for duplicate or empty property names,
/// `required_properties` that are not declared, or a bad default
pub fn object_field<K, I>(properties: I, options: ObjectOptions) -> Result<FieldDefinition, SchemaError>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, FieldDefinition)>,
{
    let mut declared = IndexMap::new();
    for (name, definition) in properties {
        let name = name.into();
        if declared.contains_key(&name) {
            return Err(SchemaError::DuplicateField { name });
        }
        declared.insert(name, definition);
    }
    let kind = FieldKind::Object(ObjectConstraints {
        properties: declared,
        required_properties: options.required_properties,
        strict: !options.allow_unknown,
    });
    FieldDefinition::new(
        kind,
        options.required,
        options.default.map(Value::Object),
        options.description,
    )
}

/// One of a fixed set of JSON values
///
/// # Errors
///
/// Returns [`SchemaError::EmptyEnum`] for an empty list, or
/// [`SchemaError::InvalidDefault`] if the default is not in the list
pub fn enum_field(values: Vec<Value>, options: BasicOptions) -> Result<FieldDefinition, SchemaError> {
    basic(FieldKind::Enum(EnumConstraints { values }), options)
}

/// File descriptor field
///
/// # Errors
///
/// Never fails today; kept fallible like the other helpers
pub fn file_field(options: FileOptions) -> Result<FieldDefinition, SchemaError> {
    let kind = FieldKind::File(FileConstraints {
        allowed_mime_types: options.allowed_mime_types.into_iter().collect(),
        max_file_size_bytes: options.max_file_size_bytes,
    });
    FieldDefinition::new(kind, options.required, None, options.description)
}

/// Credential field whose value is never echoed or logged
///
/// # Errors
///
/// Never fails today; kept fallible like the other helpers
pub fn secret_field(options: SecretOptions) -> Result<FieldDefinition, SchemaError> {
    let kind = FieldKind::SecretKey(SecretConstraints {
        min_length: options.min_length,
    });
    FieldDefinition::new(kind, options.required, None, options.description)
}

/// [`secret_field`] described as an API key
///
/// # Errors
///
/// Never fails today; kept fallible like the other helpers
pub fn api_key_field(options: SecretOptions) -> Result<FieldDefinition, SchemaError> {
    secret_field(SecretOptions {
        description: options.description.or_else(|| Some("API key".to_string())),
        ..options
    })
}
