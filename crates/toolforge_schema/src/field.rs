//! Field definitions: the contract for one input or config value.
//!
//! A [`FieldDefinition`] is immutable once constructed. Every constructor
//! runs the consistency checks, so a definition that exists is a definition
//! whose constraints agree with its kind and with each other.

use crate::check;
use crate::error::SchemaError;
use crate::format;
use crate::validate::FieldPath;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Named string formats with dedicated matchers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    /// `local@domain.tld`
    Email,
    /// Absolute URL with a host
    Url,
    /// Hyphenated UUID
    Uuid,
    /// RFC 1123 hostname
    Hostname,
    /// Dotted-quad IPv4 address
    Ipv4,
}

impl StringFormat {
    /// Format name as used in documents and JSON Schema
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Url => "url",
            Self::Uuid => "uuid",
            Self::Hostname => "hostname",
            Self::Ipv4 => "ipv4",
        }
    }

    /// Check whether a string conforms to this format
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Email => format::is_email(value),
            Self::Url => format::is_url(value),
            Self::Uuid => format::is_uuid(value),
            Self::Hostname => format::is_hostname(value),
            Self::Ipv4 => format::is_ipv4(value),
        }
    }
}

impl std::fmt::Display for StringFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled regular expression that must match a whole string
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern; the match is anchored at both ends
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidPattern`] if the expression does not compile
    pub fn new(source: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| {
            SchemaError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Pattern as written by the schema author
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Full-match test
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Constraints for string fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringConstraints {
    /// Minimum length in characters (inclusive)
    pub min_length: Option<usize>,
    /// Maximum length in characters (inclusive)
    pub max_length: Option<usize>,
    /// Full-match pattern
    pub pattern: Option<Pattern>,
    /// Named format
    pub format: Option<StringFormat>,
    /// Allowed values; empty means unrestricted
    pub enum_values: Vec<String>,
}

/// Constraints for number fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberConstraints {
    /// Minimum value (inclusive)
    pub min: Option<f64>,
    /// Maximum value (inclusive)
    pub max: Option<f64>,
    /// Reject values with a fractional part
    pub integer_only: bool,
}

/// Constraints for array fields
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayConstraints {
    /// Definition every element must satisfy
    pub items: Box<FieldDefinition>,
    /// Minimum element count (inclusive)
    pub min_items: Option<usize>,
    /// Maximum element count (inclusive)
    pub max_items: Option<usize>,
}

/// Constraints for object fields
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectConstraints {
    /// Nested sub-schema, in declaration order
    pub properties: IndexMap<String, FieldDefinition>,
    /// Properties required regardless of their own `required` flag
    pub required_properties: Vec<String>,
    /// Reject keys not declared in `properties`
    pub strict: bool,
}

impl ObjectConstraints {
    /// Create strict constraints over the given properties
    #[must_use]
    pub fn new(properties: IndexMap<String, FieldDefinition>) -> Self {
        Self {
            properties,
            required_properties: Vec::new(),
            strict: true,
        }
    }

    /// Whether a property must be present
    #[must_use]
    pub fn is_property_required(&self, name: &str) -> bool {
        self.properties.get(name).is_some_and(FieldDefinition::is_required)
            || self.required_properties.iter().any(|r| r == name)
    }
}

/// Constraints for enum fields
#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstraints {
    /// Accepted values; never empty
    pub values: Vec<Value>,
}

/// Constraints for file fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileConstraints {
    /// Accepted MIME types, lowercase; `type/*` wildcards allowed. Empty means any.
    pub allowed_mime_types: BTreeSet<String>,
    /// Maximum declared size in bytes (inclusive)
    pub max_file_size_bytes: Option<u64>,
}

impl FileConstraints {
    /// Whether a MIME type is accepted
    #[must_use]
    pub fn allows_mime_type(&self, mime_type: &str) -> bool {
        if self.allowed_mime_types.is_empty() {
            return true;
        }
        let mime_type = mime_type.to_ascii_lowercase();
        self.allowed_mime_types.iter().any(|allowed| {
            match allowed.strip_suffix("/*") {
                Some(family) => mime_type
                    .split_once('/')
                    .is_some_and(|(major, _)| major == family),
                None => *allowed == mime_type,
            }
        })
    }
}

/// Constraints for secret-key fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretConstraints {
    /// Minimum length in characters (inclusive)
    pub min_length: Option<usize>,
}

/// Kind of a field together with its kind-specific constraints
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// UTF-8 string
    String(StringConstraints),
    /// JSON number
    Number(NumberConstraints),
    /// `true` or `false`
    Boolean,
    /// ISO-8601 calendar date
    Date,
    /// ISO-8601 time of day
    Time,
    /// ISO-8601 date and time
    DateTime,
    /// Homogeneous array
    Array(ArrayConstraints),
    /// Nested object
    Object(ObjectConstraints),
    /// One of a fixed set of values
    Enum(EnumConstraints),
    /// File descriptor
    File(FileConstraints),
    /// Non-loggable string credential
    SecretKey(SecretConstraints),
}

impl FieldKind {
    /// Kind tag as used in documents and messages
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Enum(_) => "enum",
            Self::File(_) => "file",
            Self::SecretKey(_) => "secret-key",
        }
    }

    fn check_consistency(&mut self) -> Result<(), SchemaError> {
        match self {
            Self::String(c) => check_bounds("min_length/max_length", c.min_length, c.max_length),
            Self::Number(c) => {
                for (name, bound) in [("min", c.min), ("max", c.max)] {
                    if bound.is_some_and(|b| !b.is_finite()) {
                        return Err(SchemaError::NonFiniteBound { constraint: name });
                    }
                }
                check_bounds("min/max", c.min, c.max)
            }
            Self::Array(c) => check_bounds("min_items/max_items", c.min_items, c.max_items),
            Self::Object(c) => {
                for name in &c.required_properties {
                    if !c.properties.contains_key(name) {
                        return Err(SchemaError::UnknownRequiredProperty { name: name.clone() });
                    }
                }
                if c.properties.keys().any(String::is_empty) {
                    return Err(SchemaError::EmptyFieldName);
                }
                Ok(())
            }
            Self::Enum(c) => {
                if c.values.is_empty() {
                    return Err(SchemaError::EmptyEnum);
                }
                Ok(())
            }
            Self::File(c) => {
                c.allowed_mime_types = c
                    .allowed_mime_types
                    .iter()
                    .map(|m| m.trim().to_ascii_lowercase())
                    .collect();
                Ok(())
            }
            Self::Boolean | Self::Date | Self::Time | Self::DateTime | Self::SecretKey(_) => Ok(()),
        }
    }
}

fn check_bounds<T: PartialOrd + ToString>(
    constraint: &'static str,
    min: Option<T>,
    max: Option<T>,
) -> Result<(), SchemaError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(SchemaError::InvalidBounds {
            constraint,
            min: min.to_string(),
            max: max.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Contract for one input or config value
///
/// Serializes as a flat [`FieldDocument`](crate::document::FieldDocument).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "crate::document::FieldDocument",
    into = "crate::document::FieldDocument"
)]
pub struct FieldDefinition {
    kind: FieldKind,
    required: bool,
    default: Option<Value>,
    description: Option<String>,
}

impl FieldDefinition {
    /// Construct a definition, checking it for consistency
    ///
    /// A `null` default is treated as no default. A present default is
    /// validated against the definition and stored in normalized form.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the constraints contradict each other
    /// or the default does not satisfy the field
    pub fn new(
        mut kind: FieldKind,
        required: bool,
        default: Option<Value>,
        description: Option<String>,
    ) -> Result<Self, SchemaError> {
        kind.check_consistency()?;

        let mut field = Self {
            kind,
            required,
            default: None,
            description,
        };

        if let Some(default) = default.filter(|d| !d.is_null()) {
            let outcome = check::check_value(&default, &field, &FieldPath::root());
            if let Some(first) = outcome.errors.first() {
                return Err(SchemaError::InvalidDefault {
                    reason: first.message.clone(),
                });
            }
            field.default = outcome.value;
        }

        Ok(field)
    }

    /// Kind and constraints
    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether a value must be supplied
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Normalized default, if any
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the field itself holds a secret
    #[must_use]
    pub const fn is_secret(&self) -> bool {
        matches!(self.kind, FieldKind::SecretKey(_))
    }

    /// Whether the field or any nested field holds a secret
    #[must_use]
    pub fn contains_secret(&self) -> bool {
        match &self.kind {
            FieldKind::SecretKey(_) => true,
            FieldKind::Array(c) => c.items.contains_secret(),
            FieldKind::Object(c) => c.properties.values().any(Self::contains_secret),
            _ => false,
        }
    }
}
