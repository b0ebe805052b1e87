//! Projection of schemas onto JSON Schema.
//!
//! The output is meant for documentation and client generation, not for
//! validation: formats and file descriptors use extension keywords
//! (`x-secret`, `x-allowed-mime-types`) where JSON Schema has no equivalent.

use crate::field::{FieldDefinition, FieldKind, StringFormat};
use crate::schema::Schema;
use indexmap::IndexMap;
use serde_json::{Map, Value, json};

fn format_keyword(format: StringFormat) -> &'static str {
    match format {
        StringFormat::Url => "uri",
        other => other.as_str(),
    }
}

fn object_schema(
    properties: &IndexMap<String, FieldDefinition>,
    required: impl Iterator<Item = String>,
    strict: bool,
) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("type".into(), json!("object"));
    out.insert(
        "properties".into(),
        Value::Object(
            properties
                .iter()
                .map(|(name, field)| (name.clone(), field.to_json_schema()))
                .collect(),
        ),
    );
    let required: Vec<String> = required.collect();
    if !required.is_empty() {
        out.insert("required".into(), json!(required));
    }
    out.insert("additionalProperties".into(), json!(!strict));
    out
}

fn insert_some<T: Into<Value>>(out: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        out.insert(key.to_string(), value.into());
    }
}

impl FieldDefinition {
    /// JSON Schema for this field
    ///
    /// Secret fields are marked `writeOnly` and never expose a default.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut out = Map::new();
        match self.kind() {
            FieldKind::String(c) => {
                out.insert("type".into(), json!("string"));
                insert_some(&mut out, "minLength", c.min_length);
                insert_some(&mut out, "maxLength", c.max_length);
                insert_some(&mut out, "pattern", c.pattern.as_ref().map(|p| p.as_str().to_string()));
                insert_some(&mut out, "format", c.format.map(format_keyword));
                if !c.enum_values.is_empty() {
                    out.insert("enum".into(), json!(c.enum_values));
                }
            }
            FieldKind::Number(c) => {
                let kind = if c.integer_only { "integer" } else { "number" };
                out.insert("type".into(), json!(kind));
                insert_some(&mut out, "minimum", c.min);
                insert_some(&mut out, "maximum", c.max);
            }
            FieldKind::Boolean => {
                out.insert("type".into(), json!("boolean"));
            }
            FieldKind::Date | FieldKind::Time | FieldKind::DateTime => {
                let format = match self.kind() {
                    FieldKind::Date => "date",
                    FieldKind::Time => "time",
                    _ => "date-time",
                };
                out.insert("type".into(), json!("string"));
                out.insert("format".into(), json!(format));
            }
            FieldKind::Array(c) => {
                out.insert("type".into(), json!("array"));
                out.insert("items".into(), c.items.to_json_schema());
                insert_some(&mut out, "minItems", c.min_items);
                insert_some(&mut out, "maxItems", c.max_items);
            }
            FieldKind::Object(c) => {
                let required = c
                    .properties
                    .keys()
                    .filter(|name| c.is_property_required(name))
                    .cloned();
                out = object_schema(&c.properties, required, c.strict);
            }
            FieldKind::Enum(c) => {
                out.insert("enum".into(), json!(c.values));
            }
            FieldKind::File(c) => {
                out.insert("type".into(), json!("object"));
                out.insert(
                    "properties".into(),
                    json!({
                        "name": {"type": "string"},
                        "size": {"type": "integer", "minimum": 0},
                        "mime_type": {"type": "string"},
                        "content": {"type": "string"},
                    }),
                );
                out.insert("required".into(), json!(["name", "size", "mime_type", "content"]));
                if !c.allowed_mime_types.is_empty() {
                    out.insert("x-allowed-mime-types".into(), json!(c.allowed_mime_types));
                }
                insert_some(&mut out, "x-max-file-size-bytes", c.max_file_size_bytes);
            }
            FieldKind::SecretKey(c) => {
                out.insert("type".into(), json!("string"));
                out.insert("writeOnly".into(), json!(true));
                out.insert("x-secret".into(), json!(true));
                insert_some(&mut out, "minLength", c.min_length);
            }
        }

        if let Some(description) = self.description() {
            out.insert("description".into(), json!(description));
        }
        if !self.is_secret() {
            insert_some(&mut out, "default", self.default_value().cloned());
        }
        Value::Object(out)
    }
}

impl Schema {
    /// JSON Schema for the whole payload
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let required = self
            .fields()
            .iter()
            .filter(|(_, field)| field.is_required())
            .map(|(name, _)| name.clone());
        let mut out = Map::new();
        out.insert("$schema".into(), json!("https://json-schema.org/draft/2020-12/schema"));
        out.insert("title".into(), json!(self.name()));
        out.extend(object_schema(self.fields(), required, self.is_strict()));
        Value::Object(out)
    }
}
