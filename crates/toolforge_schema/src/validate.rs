//! Recursive validator.
//!
//! Walks a [`Schema`] and a raw JSON object, applies the per-kind checkers,
//! and aggregates every error into one [`ValidationResult`]. Validation never
//! stops at the first problem: callers can report everything in a single
//! response.

use crate::check::{self, CheckOutcome};
use crate::field::FieldDefinition;
use crate::schema::Schema;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Empty passthrough set used for nested objects
pub(crate) static NO_PASSTHROUGH: BTreeSet<String> = BTreeSet::new();

/// Machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A required value is absent or null
    MissingRequired,
    /// The JSON type does not match the field kind
    TypeMismatch,
    /// A length, size, count or numeric bound is violated
    OutOfRange,
    /// A string does not fully match the field pattern
    PatternMismatch,
    /// A string does not conform to its named format, or a temporal value does not parse
    FormatMismatch,
    /// A value is not in the allowed set
    EnumMismatch,
    /// A key is not declared by a strict schema
    UnknownField,
}

impl ErrorCode {
    /// Code as it appears on the wire
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequired => "missing_required",
            Self::TypeMismatch => "type_mismatch",
            Self::OutOfRange => "out_of_range",
            Self::PatternMismatch => "pattern_mismatch",
            Self::FormatMismatch => "format_mismatch",
            Self::EnumMismatch => "enum_mismatch",
            Self::UnknownField => "unknown_field",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dotted/bracketed path to a value, e.g. `address.zip` or `tags[2]`
///
/// Keys that themselves contain `.`, `[` or `]` are written in quoted
/// bracket form (`meta["a.b"]`) so they cannot be confused with nesting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// The empty path, addressing the whole payload
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Path to a named child
    #[must_use]
    pub fn key(&self, name: &str) -> Self {
        if name.contains(['.', '[', ']']) {
            Self(format!("{}[{:?}]", self.0, name))
        } else if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    /// Path to an array element
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    /// Path as a string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One problem with one field
///
/// `Display` never includes the received value, so errors are safe to log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path of the offending value
    pub field_path: String,
    /// Human-readable description
    pub message: String,
    /// Machine-readable category
    pub code: ErrorCode,
    /// The offending value, or a redaction marker for secrets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_value: Option<Value>,
}

impl ValidationError {
    /// Create an error without a received value
    #[must_use]
    pub fn new(path: &FieldPath, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            field_path: path.as_str().to_string(),
            message: message.into(),
            code,
            received_value: None,
        }
    }

    /// Attach the received value
    #[must_use]
    pub fn with_received(mut self, value: Value) -> Self {
        self.received_value = Some(value);
        self
    }

    /// Prefix the path, e.g. to place input errors under `input.`
    #[must_use]
    pub fn prefixed(mut self, prefix: &str) -> Self {
        self.field_path = if self.field_path.is_empty() {
            prefix.to_string()
        } else if self.field_path.starts_with('[') {
            format!("{}{}", prefix, self.field_path)
        } else {
            format!("{}.{}", prefix, self.field_path)
        };
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field_path.is_empty() {
            write!(f, "{} ({})", self.message, self.code)
        } else {
            write!(f, "{}: {} ({})", self.field_path, self.message, self.code)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of validating one payload against one schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` iff `errors` is empty
    pub valid: bool,
    /// Every error found, in deterministic order
    pub errors: Vec<ValidationError>,
    /// Coerced and defaulted payload; only complete when `valid`
    pub normalized_value: Value,
}

impl ValidationResult {
    fn from_outcome(outcome: CheckOutcome) -> Self {
        Self {
            valid: outcome.errors.is_empty(),
            errors: outcome.errors,
            normalized_value: outcome.value.unwrap_or_else(|| Value::Object(Map::new())),
        }
    }

    /// Whether the payload was valid
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Normalized value on success, every error otherwise
    ///
    /// # Errors
    ///
    /// Returns the aggregated errors when validation failed
    pub fn into_result(self) -> Result<Value, Vec<ValidationError>> {
        if self.valid {
            Ok(self.normalized_value)
        } else {
            Err(self.errors)
        }
    }

    /// Deserialize the normalized value into a caller type
    ///
    /// # Errors
    ///
    /// Returns a serde error if the shapes disagree
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.normalized_value)
    }

    /// Paths and codes only, safe to log
    #[must_use]
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}={}", e.field_path, e.code))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Validator for schemas
///
/// Holds only boundary policy; schemas themselves are passed per call, so
/// one validator can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    /// Top-level keys tolerated by strict schemas and dropped from the output
    passthrough: BTreeSet<String>,
}

impl Validator {
    /// Create a validator with no passthrough keys
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tolerate a top-level key that the schema does not declare
    #[must_use]
    pub fn with_passthrough(mut self, key: impl Into<String>) -> Self {
        self.passthrough.insert(key.into());
        self
    }

    /// Validate a raw payload against a schema
    #[must_use]
    pub fn validate(&self, schema: &Schema, raw: &Value) -> ValidationResult {
        let Value::Object(map) = raw else {
            let error = ValidationError::new(
                &FieldPath::root(),
                ErrorCode::TypeMismatch,
                "expected an object",
            )
            .with_received(if schema.contains_secret() {
                Value::String(check::REDACTED.to_string())
            } else {
                raw.clone()
            });
            return ValidationResult::from_outcome(CheckOutcome::rejected(error));
        };

        ValidationResult::from_outcome(walk_object(
            schema.fields(),
            &[],
            schema.is_strict(),
            map,
            &FieldPath::root(),
            &self.passthrough,
        ))
    }
}

/// Validate an object against a property map
///
/// Declared properties are checked in declaration order, then undeclared
/// keys are reported (strict) or copied through (non-strict).
pub(crate) fn walk_object(
    properties: &IndexMap<String, FieldDefinition>,
    required_properties: &[String],
    strict: bool,
    raw: &Map<String, Value>,
    path: &FieldPath,
    passthrough: &BTreeSet<String>,
) -> CheckOutcome {
    let mut normalized = Map::new();
    let mut errors = Vec::new();

    for (name, field) in properties {
        let required = field.is_required() || required_properties.iter().any(|r| r == name);
        let outcome = check::check_field_as(raw.get(name), field, &path.key(name), required);
        errors.extend(outcome.errors);
        if let Some(value) = outcome.value {
            normalized.insert(name.clone(), value);
        }
    }

    for (key, value) in raw {
        if properties.contains_key(key) || passthrough.contains(key) {
            continue;
        }
        if strict {
            errors.push(ValidationError::new(
                &path.key(key),
                ErrorCode::UnknownField,
                "is not a recognized field",
            ));
        } else {
            normalized.insert(key.clone(), value.clone());
        }
    }

    CheckOutcome {
        value: Some(Value::Object(normalized)),
        errors,
    }
}
