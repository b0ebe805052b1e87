//! Tool definitions: metadata, schemas and the handler.

use crate::trait_::ToolHandler;
use serde_json::{Value, json};
use std::sync::Arc;
use toolforge_schema::Schema;

/// Default version for tools that do not declare one
pub const DEFAULT_VERSION: &str = "0.1.0";

/// A tool ready to be dispatched
///
/// Immutable once built and shared across requests behind an `Arc`.
#[derive(Clone)]
pub struct ToolDefinition {
    id: String,
    name: String,
    version: String,
    description: Option<String>,
    input_schema: Arc<Schema>,
    config_schema: Arc<Schema>,
    handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("input_fields", &self.input_schema.len())
            .field("config_fields", &self.config_schema.len())
            .finish_non_exhaustive()
    }
}

impl ToolDefinition {
    /// Create a tool with empty input and config schemas
    ///
    /// The display name starts out equal to the id.
    #[must_use]
    pub fn new(id: impl Into<String>, handler: impl ToolHandler + 'static) -> Self {
        Self::from_arc(id, Arc::new(handler))
    }

    /// Create a tool around a shared handler
    #[must_use]
    pub fn from_arc(id: impl Into<String>, handler: Arc<dyn ToolHandler>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            version: DEFAULT_VERSION.to_string(),
            description: None,
            input_schema: Arc::new(Schema::empty("input")),
            config_schema: Arc::new(Schema::empty("config")),
            handler,
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the version
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the input schema
    #[must_use]
    pub fn with_input_schema(mut self, schema: Schema) -> Self {
        self.input_schema = Arc::new(schema);
        self
    }

    /// Set the config schema
    #[must_use]
    pub fn with_config_schema(mut self, schema: Schema) -> Self {
        self.config_schema = Arc::new(schema);
        self
    }

    /// Tool identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version string
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Description, if any
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Input schema
    #[must_use]
    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    /// Config schema
    #[must_use]
    pub fn config_schema(&self) -> &Schema {
        &self.config_schema
    }

    /// Handler
    #[must_use]
    pub fn handler(&self) -> &dyn ToolHandler {
        self.handler.as_ref()
    }

    /// Public description of the tool with JSON Schema projections
    #[must_use]
    pub fn describe(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "version": self.version,
            "description": self.description,
            "input_schema": self.input_schema.to_json_schema(),
            "config_schema": self.config_schema.to_json_schema(),
        })
    }
}
