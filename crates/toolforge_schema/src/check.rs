//! Per-kind checkers.
//!
//! Every checker takes a raw JSON value and a field definition and returns a
//! [`CheckOutcome`]: the coerced value (if any) and the errors found. Bad
//! input is never an `Err`; it is data.

use crate::field::{
    ArrayConstraints, EnumConstraints, FieldDefinition, FieldKind, FileConstraints,
    NumberConstraints, SecretConstraints, StringConstraints,
};
use crate::format;
use crate::validate::{self, ErrorCode, FieldPath, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Marker echoed in place of secret values
pub const REDACTED: &str = "[REDACTED]";

/// Result of checking one value against one field definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOutcome {
    /// Coerced value; `None` means absent or rejected
    pub value: Option<Value>,
    /// Errors in the order they were found
    pub errors: Vec<ValidationError>,
}

impl CheckOutcome {
    /// Accepted value with no errors
    #[must_use]
    pub fn accepted(value: Value) -> Self {
        Self {
            value: Some(value),
            errors: Vec::new(),
        }
    }

    /// Valid and absent
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// Single failure
    #[must_use]
    pub fn rejected(error: ValidationError) -> Self {
        Self {
            value: None,
            errors: vec![error],
        }
    }

    /// Leaf result: keep the value only when nothing was wrong with it
    fn leaf(value: Value, errors: Vec<ValidationError>) -> Self {
        if errors.is_empty() {
            Self::accepted(value)
        } else {
            Self { value: None, errors }
        }
    }

    /// Whether no errors were found
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// File descriptor shape accepted by file fields
///
/// The declared `size` is trusted; it is not recomputed from `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Original file name
    pub name: String,
    /// Declared size in bytes
    pub size: u64,
    /// MIME type
    #[serde(alias = "mimeType", alias = "type")]
    pub mime_type: String,
    /// Encoded content (typically base64) or a reference to it
    pub content: String,
}

/// Check a possibly-missing value using the field's own `required` flag
#[must_use]
pub fn check_field(raw: Option<&Value>, field: &FieldDefinition, path: &FieldPath) -> CheckOutcome {
    check_field_as(raw, field, path, field.is_required())
}

/// Check a possibly-missing value with an explicit `required` flag
pub(crate) fn check_field_as(
    raw: Option<&Value>,
    field: &FieldDefinition,
    path: &FieldPath,
    required: bool,
) -> CheckOutcome {
    match raw {
        None | Some(Value::Null) => {
            if required {
                CheckOutcome::rejected(ValidationError::new(
                    path,
                    ErrorCode::MissingRequired,
                    "is required",
                ))
            } else if let Some(default) = field.default_value() {
                CheckOutcome::accepted(default.clone())
            } else {
                CheckOutcome::absent()
            }
        }
        Some(value) => check_value(value, field, path),
    }
}

/// Check a present, non-null value
#[must_use]
pub fn check_value(raw: &Value, field: &FieldDefinition, path: &FieldPath) -> CheckOutcome {
    match field.kind() {
        FieldKind::String(c) => check_string(raw, c, path),
        FieldKind::Number(c) => check_number(raw, c, path),
        FieldKind::Boolean => check_boolean(raw, path),
        FieldKind::Date => check_temporal(raw, path, "date (YYYY-MM-DD)", format::normalize_date),
        FieldKind::Time => check_temporal(raw, path, "time (HH:MM[:SS])", format::normalize_time),
        FieldKind::DateTime => check_temporal(
            raw,
            path,
            "ISO-8601 date-time",
            format::normalize_datetime,
        ),
        FieldKind::Array(c) => check_array(raw, c, path, field.contains_secret()),
        FieldKind::Object(c) => {
            let Value::Object(map) = raw else {
                return type_mismatch(path, "object", raw, field.contains_secret());
            };
            validate::walk_object(
                &c.properties,
                &c.required_properties,
                c.strict,
                map,
                path,
                &validate::NO_PASSTHROUGH,
            )
        }
        FieldKind::Enum(c) => check_enum(raw, c, path),
        FieldKind::File(c) => check_file(raw, c, path),
        FieldKind::SecretKey(c) => check_secret(raw, c, path),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn received(value: &Value, redact: bool) -> Value {
    if redact {
        Value::String(REDACTED.to_string())
    } else {
        value.clone()
    }
}

fn type_mismatch(path: &FieldPath, expected: &str, raw: &Value, redact: bool) -> CheckOutcome {
    CheckOutcome::rejected(
        ValidationError::new(
            path,
            ErrorCode::TypeMismatch,
            format!("expected {}, got {}", expected, json_type_name(raw)),
        )
        .with_received(received(raw, redact)),
    )
}

fn length_error(
    len: usize,
    min: Option<usize>,
    max: Option<usize>,
    unit: &str,
) -> Option<String> {
    match (min, max) {
        (Some(min), _) if len < min => Some(format!(
            "must contain at least {} {}, got {}",
            min, unit, len
        )),
        (_, Some(max)) if len > max => Some(format!(
            "must contain at most {} {}, got {}",
            max, unit, len
        )),
        _ => None,
    }
}

fn check_string(raw: &Value, c: &StringConstraints, path: &FieldPath) -> CheckOutcome {
    let Value::String(s) = raw else {
        return type_mismatch(path, "string", raw, false);
    };
    let mut errors = Vec::new();

    if let Some(message) = length_error(s.chars().count(), c.min_length, c.max_length, "characters") {
        errors.push(ValidationError::new(path, ErrorCode::OutOfRange, message).with_received(raw.clone()));
    }

    if let Some(pattern) = &c.pattern {
        if !pattern.is_match(s) {
            errors.push(
                ValidationError::new(
                    path,
                    ErrorCode::PatternMismatch,
                    format!("must match pattern {}", pattern.as_str()),
                )
                .with_received(raw.clone()),
            );
        }
    }

    if let Some(format) = c.format {
        if !format.matches(s) {
            errors.push(
                ValidationError::new(
                    path,
                    ErrorCode::FormatMismatch,
                    format!("must be a valid {}", format),
                )
                .with_received(raw.clone()),
            );
        }
    }

    if !c.enum_values.is_empty() && !c.enum_values.iter().any(|v| v == s) {
        errors.push(
            ValidationError::new(
                path,
                ErrorCode::EnumMismatch,
                format!("must be one of: {}", c.enum_values.join(", ")),
            )
            .with_received(raw.clone()),
        );
    }

    CheckOutcome::leaf(raw.clone(), errors)
}

fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
}

/// Exact integer value of an integer-typed number
fn exact_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Integral floats as integers, so `3.0` normalizes to `3`
fn integral_number(n: &Number) -> Number {
    if exact_integer(n).is_some() {
        return n.clone();
    }
    match n.as_f64() {
        // 2^63 and 2^64 are exact in f64, so the casts below are lossless
        Some(f) if f.fract() == 0.0 && f >= -(2f64.powi(63)) && f < 2f64.powi(63) => {
            Number::from(f as i64)
        }
        Some(f) if f.fract() == 0.0 && f >= 0.0 && f < 2f64.powi(64) => Number::from(f as u64),
        _ => n.clone(),
    }
}

/// Inclusive bounds check; integers compare exactly against the tightest
/// integral bound
fn out_of_bounds(n: &Number, c: &NumberConstraints) -> bool {
    if let Some(v) = exact_integer(n) {
        // float-to-int casts saturate, so out-of-range bounds stay on the correct side
        let below = c.min.is_some_and(|min| v < min.ceil() as i128);
        let above = c.max.is_some_and(|max| v > max.floor() as i128);
        return below || above;
    }
    n.as_f64().is_some_and(|value| {
        c.min.is_some_and(|min| value < min) || c.max.is_some_and(|max| value > max)
    })
}

/// JSON equality with numbers compared by value, so `1` equals `1.0`
fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (exact_integer(x), exact_integer(y)) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

fn check_number(raw: &Value, c: &NumberConstraints, path: &FieldPath) -> CheckOutcome {
    let Value::Number(n) = raw else {
        return type_mismatch(path, "number", raw, false);
    };
    let mut errors = Vec::new();

    if c.integer_only && !is_integral(n) {
        errors.push(
            ValidationError::new(path, ErrorCode::TypeMismatch, "expected an integer")
                .with_received(raw.clone()),
        );
    }

    if out_of_bounds(n, c) {
        let message = match (c.min, c.max) {
            (Some(min), Some(max)) => format!("must be between {} and {}", min, max),
            (Some(min), None) => format!("must be at least {}", min),
            (None, Some(max)) => format!("must be at most {}", max),
            (None, None) => "out of range".to_string(),
        };
        errors.push(ValidationError::new(path, ErrorCode::OutOfRange, message).with_received(raw.clone()));
    }

    let value = if c.integer_only {
        Value::Number(integral_number(n))
    } else {
        raw.clone()
    };
    CheckOutcome::leaf(value, errors)
}

fn check_boolean(raw: &Value, path: &FieldPath) -> CheckOutcome {
    match raw {
        Value::Bool(_) => CheckOutcome::accepted(raw.clone()),
        _ => type_mismatch(path, "boolean", raw, false),
    }
}

fn check_temporal(
    raw: &Value,
    path: &FieldPath,
    expected: &str,
    normalize: fn(&str) -> Option<String>,
) -> CheckOutcome {
    let Value::String(s) = raw else {
        return type_mismatch(path, "string", raw, false);
    };
    match normalize(s) {
        Some(normalized) => CheckOutcome::accepted(Value::String(normalized)),
        None => CheckOutcome::rejected(
            ValidationError::new(
                path,
                ErrorCode::FormatMismatch,
                format!("must be a valid {}", expected),
            )
            .with_received(raw.clone()),
        ),
    }
}

fn check_array(raw: &Value, c: &ArrayConstraints, path: &FieldPath, redact: bool) -> CheckOutcome {
    let Value::Array(items) = raw else {
        return type_mismatch(path, "array", raw, redact);
    };
    let mut errors = Vec::new();

    if let Some(message) = length_error(items.len(), c.min_items, c.max_items, "items") {
        errors.push(
            ValidationError::new(path, ErrorCode::OutOfRange, message)
                .with_received(received(raw, redact)),
        );
    }

    let mut normalized = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let outcome = check_field(Some(item), &c.items, &path.index(i));
        errors.extend(outcome.errors);
        // Absent elements keep their slot so indices stay stable
        normalized.push(outcome.value.unwrap_or(Value::Null));
    }

    CheckOutcome {
        value: Some(Value::Array(normalized)),
        errors,
    }
}

fn check_enum(raw: &Value, c: &EnumConstraints, path: &FieldPath) -> CheckOutcome {
    if let Some(value) = c.values.iter().find(|v| json_equal(v, raw)) {
        return CheckOutcome::accepted(value.clone());
    }
    let allowed: Vec<String> = c.values.iter().map(Value::to_string).collect();
    CheckOutcome::rejected(
        ValidationError::new(
            path,
            ErrorCode::EnumMismatch,
            format!("must be one of: {}", allowed.join(", ")),
        )
        .with_received(raw.clone()),
    )
}

fn check_file(raw: &Value, c: &FileConstraints, path: &FieldPath) -> CheckOutcome {
    let descriptor = match FileDescriptor::deserialize(raw) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            return CheckOutcome::rejected(
                ValidationError::new(
                    path,
                    ErrorCode::TypeMismatch,
                    format!("expected a file descriptor {{name, size, mime_type, content}}: {}", e),
                )
                .with_received(raw.clone()),
            );
        }
    };
    let mut errors = Vec::new();

    if !c.allows_mime_type(&descriptor.mime_type) {
        let allowed: Vec<&str> = c.allowed_mime_types.iter().map(String::as_str).collect();
        errors.push(
            ValidationError::new(
                path,
                ErrorCode::EnumMismatch,
                format!(
                    "file type {} is not allowed; expected one of: {}",
                    descriptor.mime_type,
                    allowed.join(", ")
                ),
            )
            .with_received(Value::String(descriptor.mime_type.clone())),
        );
    }

    if let Some(max) = c.max_file_size_bytes {
        if descriptor.size > max {
            errors.push(
                ValidationError::new(
                    path,
                    ErrorCode::OutOfRange,
                    format!(
                        "file size {} bytes exceeds maximum of {} bytes",
                        descriptor.size, max
                    ),
                )
                .with_received(Value::from(descriptor.size)),
            );
        }
    }

    match serde_json::to_value(&descriptor) {
        Ok(value) => CheckOutcome::leaf(value, errors),
        Err(_) => CheckOutcome::leaf(raw.clone(), errors),
    }
}

fn check_secret(raw: &Value, c: &SecretConstraints, path: &FieldPath) -> CheckOutcome {
    let Value::String(s) = raw else {
        return type_mismatch(path, "string", raw, true);
    };
    let mut errors = Vec::new();

    if let Some(message) = length_error(s.chars().count(), c.min_length, None, "characters") {
        errors.push(
            ValidationError::new(path, ErrorCode::OutOfRange, message)
                .with_received(received(raw, true)),
        );
    }

    CheckOutcome::leaf(raw.clone(), errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, ObjectConstraints, Pattern, StringFormat};
    use indexmap::IndexMap;
    use serde_json::json;

    fn field(kind: FieldKind) -> FieldDefinition {
        FieldDefinition::new(kind, false, None, None).unwrap()
    }

    fn required(kind: FieldKind) -> FieldDefinition {
        FieldDefinition::new(kind, true, None, None).unwrap()
    }

    fn path(name: &str) -> FieldPath {
        FieldPath::root().key(name)
    }

    fn codes(outcome: &CheckOutcome) -> Vec<ErrorCode> {
        outcome.errors.iter().map(|e| e.code).collect()
    }

    fn string(c: StringConstraints) -> FieldDefinition {
        field(FieldKind::String(c))
    }

    #[test]
    fn test_missing_required_stops_further_checks() {
        let def = required(FieldKind::String(StringConstraints {
            min_length: Some(3),
            ..StringConstraints::default()
        }));
        for raw in [None, Some(&Value::Null)] {
            let outcome = check_field(raw, &def, &path("name"));
            assert_eq!(codes(&outcome), vec![ErrorCode::MissingRequired]);
            assert_eq!(outcome.errors[0].field_path, "name");
            assert!(outcome.errors[0].received_value.is_none());
            assert!(outcome.value.is_none());
        }
    }

    #[test]
    fn test_missing_optional_uses_default() {
        let def = FieldDefinition::new(
            FieldKind::Number(NumberConstraints::default()),
            false,
            Some(json!(1)),
            None,
        )
        .unwrap();
        let outcome = check_field(None, &def, &path("amount"));
        assert!(outcome.is_ok());
        assert_eq!(outcome.value, Some(json!(1)));
    }

    #[test]
    fn test_missing_optional_without_default_is_absent() {
        let outcome = check_field(None, &field(FieldKind::Boolean), &path("flag"));
        assert_eq!(outcome, CheckOutcome::absent());
    }

    #[test]
    fn test_string_rejects_numbers_and_booleans() {
        let def = string(StringConstraints::default());
        for raw in [json!(5), json!(true)] {
            let outcome = check_value(&raw, &def, &path("s"));
            assert_eq!(codes(&outcome), vec![ErrorCode::TypeMismatch]);
            assert_eq!(outcome.errors[0].received_value, Some(raw));
        }
    }

    #[test]
    fn test_string_length_bounds_inclusive() {
        let def = string(StringConstraints {
            min_length: Some(2),
            max_length: Some(4),
            ..StringConstraints::default()
        });
        assert!(check_value(&json!("ab"), &def, &path("s")).is_ok());
        assert!(check_value(&json!("abcd"), &def, &path("s")).is_ok());
        assert_eq!(codes(&check_value(&json!("a"), &def, &path("s"))), vec![ErrorCode::OutOfRange]);
        assert_eq!(codes(&check_value(&json!("abcde"), &def, &path("s"))), vec![ErrorCode::OutOfRange]);
    }

    #[test]
    fn test_string_length_counts_characters() {
        let def = string(StringConstraints {
            max_length: Some(2),
            ..StringConstraints::default()
        });
        assert!(check_value(&json!("éé"), &def, &path("s")).is_ok());
    }

    #[test]
    fn test_string_reports_all_violations_in_fixed_order() {
        let def = string(StringConstraints {
            min_length: Some(10),
            max_length: None,
            pattern: Some(Pattern::new("[a-z]+").unwrap()),
            format: Some(StringFormat::Email),
            enum_values: vec!["alpha@example.com".to_string()],
        });
        let outcome = check_value(&json!("B1"), &def, &path("s"));
        assert_eq!(
            codes(&outcome),
            vec![
                ErrorCode::OutOfRange,
                ErrorCode::PatternMismatch,
                ErrorCode::FormatMismatch,
                ErrorCode::EnumMismatch,
            ]
        );
        assert!(outcome.value.is_none());
    }

    #[test]
    fn test_number_rejects_numeric_strings() {
        let def = field(FieldKind::Number(NumberConstraints::default()));
        let outcome = check_value(&json!("42"), &def, &path("n"));
        assert_eq!(codes(&outcome), vec![ErrorCode::TypeMismatch]);
    }

    #[test]
    fn test_number_rejects_booleans() {
        let def = field(FieldKind::Number(NumberConstraints::default()));
        assert_eq!(codes(&check_value(&json!(true), &def, &path("n"))), vec![ErrorCode::TypeMismatch]);
    }

    #[test]
    fn test_number_integer_then_range() {
        let def = field(FieldKind::Number(NumberConstraints {
            min: Some(0.0),
            max: Some(10.0),
            integer_only: true,
        }));
        assert!(check_value(&json!(10), &def, &path("n")).is_ok());
        assert!(check_value(&json!(3.0), &def, &path("n")).is_ok());
        assert_eq!(
            codes(&check_value(&json!(10.5), &def, &path("n"))),
            vec![ErrorCode::TypeMismatch, ErrorCode::OutOfRange]
        );
        assert_eq!(codes(&check_value(&json!(-1), &def, &path("n"))), vec![ErrorCode::OutOfRange]);
    }

    #[test]
    fn test_number_keeps_representation() {
        let def = field(FieldKind::Number(NumberConstraints::default()));
        assert_eq!(check_value(&json!(7), &def, &path("n")).value, Some(json!(7)));
        assert_eq!(check_value(&json!(7.25), &def, &path("n")).value, Some(json!(7.25)));
    }

    #[test]
    fn test_integer_normalizes_integral_floats() {
        let def = field(FieldKind::Number(NumberConstraints {
            integer_only: true,
            ..NumberConstraints::default()
        }));
        let outcome = check_value(&json!(3.0), &def, &path("count"));
        assert_eq!(outcome.value, Some(json!(3)));
        assert!(outcome.value.unwrap().is_u64());
        let outcome = check_value(&json!(-4.0), &def, &path("count"));
        assert!(outcome.value.unwrap().is_i64());
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let limit = 2f64.powi(53);
        let def = field(FieldKind::Number(NumberConstraints {
            min: Some(-limit),
            max: Some(limit),
            integer_only: true,
        }));
        assert!(check_value(&json!(9_007_199_254_740_992_u64), &def, &path("n")).is_ok());
        assert_eq!(
            codes(&check_value(&json!(9_007_199_254_740_993_u64), &def, &path("n"))),
            vec![ErrorCode::OutOfRange]
        );
        assert_eq!(
            codes(&check_value(&json!(-9_007_199_254_740_993_i64), &def, &path("n"))),
            vec![ErrorCode::OutOfRange]
        );
    }

    #[test]
    fn test_fractional_bounds_against_integers() {
        let def = field(FieldKind::Number(NumberConstraints {
            min: Some(0.5),
            max: Some(2.5),
            integer_only: false,
        }));
        assert_eq!(codes(&check_value(&json!(0), &def, &path("n"))), vec![ErrorCode::OutOfRange]);
        assert!(check_value(&json!(1), &def, &path("n")).is_ok());
        assert!(check_value(&json!(2), &def, &path("n")).is_ok());
        assert_eq!(codes(&check_value(&json!(3), &def, &path("n"))), vec![ErrorCode::OutOfRange]);
    }

    #[test]
    fn test_boolean_rejects_strings() {
        let def = field(FieldKind::Boolean);
        assert!(check_value(&json!(false), &def, &path("b")).is_ok());
        assert_eq!(codes(&check_value(&json!("true"), &def, &path("b"))), vec![ErrorCode::TypeMismatch]);
        assert_eq!(codes(&check_value(&json!(1), &def, &path("b"))), vec![ErrorCode::TypeMismatch]);
    }

    #[test]
    fn test_date_normalizes_and_rejects_bad_calendar() {
        let def = field(FieldKind::Date);
        assert_eq!(check_value(&json!("2024-02-29"), &def, &path("d")).value, Some(json!("2024-02-29")));
        assert_eq!(codes(&check_value(&json!("2024-13-01"), &def, &path("d"))), vec![ErrorCode::FormatMismatch]);
        assert_eq!(codes(&check_value(&json!(20240101), &def, &path("d"))), vec![ErrorCode::TypeMismatch]);
    }

    #[test]
    fn test_datetime_normalizes_to_utc() {
        let def = field(FieldKind::DateTime);
        let outcome = check_value(&json!("2024-03-01T08:15:00-05:00"), &def, &path("at"));
        assert_eq!(outcome.value, Some(json!("2024-03-01T13:15:00Z")));
    }

    #[test]
    fn test_time_normalizes() {
        let def = field(FieldKind::Time);
        assert_eq!(check_value(&json!("07:05"), &def, &path("t")).value, Some(json!("07:05:00")));
    }

    #[test]
    fn test_array_collects_every_element_error() {
        let items = required(FieldKind::Number(NumberConstraints {
            min: Some(0.0),
            ..NumberConstraints::default()
        }));
        let def = field(FieldKind::Array(ArrayConstraints {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }));
        let outcome = check_value(&json!([1, -1, "x", null]), &def, &path("nums"));
        let paths: Vec<&str> = outcome.errors.iter().map(|e| e.field_path.as_str()).collect();
        assert_eq!(paths, vec!["nums[1]", "nums[2]", "nums[3]"]);
        assert_eq!(
            codes(&outcome),
            vec![ErrorCode::OutOfRange, ErrorCode::TypeMismatch, ErrorCode::MissingRequired]
        );
    }

    #[test]
    fn test_array_item_count_is_one_error() {
        let def = field(FieldKind::Array(ArrayConstraints {
            items: Box::new(field(FieldKind::Boolean)),
            min_items: Some(3),
            max_items: None,
        }));
        let outcome = check_value(&json!([true, false]), &def, &path("flags"));
        assert_eq!(codes(&outcome), vec![ErrorCode::OutOfRange]);
        assert_eq!(outcome.errors[0].field_path, "flags");
    }

    #[test]
    fn test_array_keeps_slots_for_absent_items() {
        let def = field(FieldKind::Array(ArrayConstraints {
            items: Box::new(field(FieldKind::Boolean)),
            min_items: None,
            max_items: None,
        }));
        let outcome = check_value(&json!([true, null]), &def, &path("flags"));
        assert!(outcome.is_ok());
        assert_eq!(outcome.value, Some(json!([true, null])));
    }

    #[test]
    fn test_object_prefixes_nested_paths() {
        let mut properties = IndexMap::new();
        properties.insert("zip".to_string(), required(FieldKind::String(StringConstraints::default())));
        let def = field(FieldKind::Object(ObjectConstraints::new(properties)));
        let outcome = check_value(&json!({"zip": 12345}), &def, &path("address"));
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].field_path, "address.zip");
    }

    #[test]
    fn test_object_type_mismatch_redacts_when_secret_inside() {
        let mut properties = IndexMap::new();
        properties.insert(
            "token".to_string(),
            required(FieldKind::SecretKey(SecretConstraints::default())),
        );
        let def = field(FieldKind::Object(ObjectConstraints::new(properties)));
        let outcome = check_value(&json!(["sk-live-123"]), &def, &path("auth"));
        assert_eq!(outcome.errors[0].received_value, Some(json!(REDACTED)));
    }

    #[test]
    fn test_enum_membership() {
        let def = field(FieldKind::Enum(EnumConstraints {
            values: vec![json!("low"), json!("high"), json!(3)],
        }));
        assert!(check_value(&json!("low"), &def, &path("level")).is_ok());
        assert!(check_value(&json!(3), &def, &path("level")).is_ok());
        let outcome = check_value(&json!("medium"), &def, &path("level"));
        assert_eq!(codes(&outcome), vec![ErrorCode::EnumMismatch]);
        assert_eq!(outcome.errors[0].message, "must be one of: \"low\", \"high\", 3");
    }

    #[test]
    fn test_enum_compares_numbers_by_value() {
        let def = field(FieldKind::Enum(EnumConstraints {
            values: vec![json!(1), json!(2)],
        }));
        let outcome = check_value(&json!(1.0), &def, &path("level"));
        assert!(outcome.is_ok());
        assert_eq!(outcome.value, Some(json!(1)));
        assert_eq!(
            codes(&check_value(&json!(1.5), &def, &path("level"))),
            vec![ErrorCode::EnumMismatch]
        );
        assert_eq!(
            codes(&check_value(&json!("1"), &def, &path("level"))),
            vec![ErrorCode::EnumMismatch]
        );
    }

    #[test]
    fn test_file_descriptor_checks() {
        let def = field(FieldKind::File(FileConstraints {
            allowed_mime_types: ["image/png".to_string()].into_iter().collect(),
            max_file_size_bytes: Some(1024),
        }));
        let ok = json!({"name": "a.png", "size": 1024, "mimeType": "image/png", "content": "iVBOR"});
        let outcome = check_value(&ok, &def, &path("upload"));
        assert!(outcome.is_ok());
        assert_eq!(
            outcome.value,
            Some(json!({"name": "a.png", "size": 1024, "mime_type": "image/png", "content": "iVBOR"}))
        );

        let bad = json!({"name": "a.txt", "size": 4096, "mime_type": "text/plain", "content": ""});
        assert_eq!(
            codes(&check_value(&bad, &def, &path("upload"))),
            vec![ErrorCode::EnumMismatch, ErrorCode::OutOfRange]
        );

        let shapeless = json!({"name": "a.png"});
        assert_eq!(codes(&check_value(&shapeless, &def, &path("upload"))), vec![ErrorCode::TypeMismatch]);
    }

    #[test]
    fn test_secret_never_echoed() {
        let def = required(FieldKind::SecretKey(SecretConstraints {
            min_length: Some(20),
        }));
        let outcome = check_value(&json!("sk-short"), &def, &path("api_key"));
        assert_eq!(codes(&outcome), vec![ErrorCode::OutOfRange]);
        assert_eq!(outcome.errors[0].received_value, Some(json!(REDACTED)));

        let outcome = check_value(&json!(12345), &def, &path("api_key"));
        assert_eq!(codes(&outcome), vec![ErrorCode::TypeMismatch]);
        assert_eq!(outcome.errors[0].received_value, Some(json!(REDACTED)));
    }

    #[test]
    fn test_secret_accepted_value_passes_through() {
        let def = required(FieldKind::SecretKey(SecretConstraints::default()));
        let outcome = check_value(&json!("sk-live-abc"), &def, &path("api_key"));
        assert_eq!(outcome.value, Some(json!("sk-live-abc")));
    }
}
