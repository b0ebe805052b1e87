//! Schema authoring errors.
//!
//! These are programmer errors detected when a field or schema is
//! constructed, never while validating a request.

/// Error raised while constructing a field definition or schema
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// A lower bound exceeds its upper bound
    #[error("Invalid bounds for {constraint}: minimum {min} exceeds maximum {max}")]
    InvalidBounds {
        /// Constraint pair, e.g. `min_length/max_length`
        constraint: &'static str,
        /// Lower bound as written
        min: String,
        /// Upper bound as written
        max: String,
    },

    /// A numeric bound is NaN or infinite
    #[error("Bound {constraint} must be a finite number")]
    NonFiniteBound {
        /// Offending constraint
        constraint: &'static str,
    },

    /// A pattern failed to compile
    #[error("Invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// Pattern source
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// An enum field was declared without values
    #[error("Enum field requires at least one value")]
    EmptyEnum,

    /// `required_properties` names a property that is not declared
    #[error("Required property {name:?} is not declared in properties")]
    UnknownRequiredProperty {
        /// Undeclared property name
        name: String,
    },

    /// The default value does not satisfy its own field definition
    #[error("Default value does not satisfy the field: {reason}")]
    InvalidDefault {
        /// First validation failure for the default
        reason: String,
    },

    /// A field name is empty
    #[error("Field names must not be empty")]
    EmptyFieldName,

    /// The same field name was declared twice
    #[error("Field {name:?} is declared more than once")]
    DuplicateField {
        /// Duplicated name
        name: String,
    },

    /// A constraint was set that is meaningless for the field kind
    #[error("Constraint {constraint} does not apply to {kind} fields")]
    InapplicableConstraint {
        /// Constraint name as written in the document
        constraint: &'static str,
        /// Field kind
        kind: &'static str,
    },

    /// A schema document is structurally invalid
    #[error("Invalid schema document: {reason}")]
    InvalidDocument {
        /// Parser message
        reason: String,
    },

    /// Context wrapper naming the field an error belongs to
    #[error("Invalid field {field:?}: {source}")]
    InField {
        /// Field name or nested path
        field: String,
        /// Underlying error
        #[source]
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    /// Attach the name of the field this error was raised for
    #[must_use]
    pub fn in_field(self, field: impl Into<String>) -> Self {
        let field = field.into();
        match self {
            // Nested contexts collapse into one dotted path
            Self::InField {
                field: inner,
                source,
            } => Self::InField {
                field: format!("{}.{}", field, inner),
                source,
            },
            other => Self::InField {
                field,
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SchemaError::InvalidBounds {
            constraint: "min_length/max_length",
            min: "5".to_string(),
            max: "2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid bounds for min_length/max_length: minimum 5 exceeds maximum 2"
        );
    }

    #[test]
    fn test_in_field_nests_paths() {
        let err = SchemaError::EmptyEnum.in_field("status").in_field("order");
        assert_eq!(
            err,
            SchemaError::InField {
                field: "order.status".to_string(),
                source: Box::new(SchemaError::EmptyEnum),
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid field \"order.status\": Enum field requires at least one value"
        );
    }
}
