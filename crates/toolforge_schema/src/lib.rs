//! Declarative field schemas and the validation engine for toolforge tools.
//!
//! A tool declares its input and config as [`Schema`]s built from
//! [`FieldDefinition`]s. The [`Validator`] checks a raw JSON payload against
//! a schema, collects every problem as a [`ValidationError`], and produces a
//! normalized payload with defaults applied and temporal values canonicalized.
//!
//! ```
//! use serde_json::json;
//! use toolforge_schema::builders::{string_field, StringOptions};
//! use toolforge_schema::{Schema, Validator};
//!
//! let schema = Schema::builder("input")
//!     .try_field("city", string_field(StringOptions { required: true, ..Default::default() }))
//!     .build()
//!     .unwrap();
//!
//! let result = Validator::new().validate(&schema, &json!({"city": "Oslo"}));
//! assert!(result.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builders;
pub mod check;
pub mod document;
pub mod error;
pub mod field;
pub mod format;
pub mod json_schema;
pub mod schema;
pub mod validate;

pub use check::{CheckOutcome, FileDescriptor, REDACTED};
pub use document::{FieldDocument, FieldKindTag, SchemaDocument};
pub use error::SchemaError;
pub use field::{
    ArrayConstraints, EnumConstraints, FieldDefinition, FieldKind, FileConstraints,
    NumberConstraints, ObjectConstraints, Pattern, SecretConstraints, StringConstraints,
    StringFormat,
};
pub use schema::{Schema, SchemaBuilder};
pub use validate::{ErrorCode, FieldPath, ValidationError, ValidationResult, Validator};
