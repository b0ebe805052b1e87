//! Tool handler trait and handler errors.

use crate::context::ExecutionContext;
use crate::envelope::codes;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

/// Failure reported by a tool handler
///
/// The message is returned to the caller verbatim, so it must not contain
/// secrets or internal detail the caller should not see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ToolError {
    /// Machine-readable code, `EXECUTION_ERROR` unless the handler picks one
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Structured detail for the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ToolError {
    /// Error with the default `EXECUTION_ERROR` code
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_code(codes::EXECUTION_ERROR, message)
    }

    /// Error with a handler-chosen code
    #[must_use]
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured detail
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<String> for ToolError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ToolError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Invalid data: {}", err))
    }
}

/// Business logic of a tool
///
/// Handlers receive input and config that have already been validated and
/// normalized against the tool's schemas.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] when the tool cannot produce output
    async fn execute(
        &self,
        input: Value,
        config: Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, ToolError>;
}

/// [`ToolHandler`] backed by an async closure
pub struct FnHandler<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

/// Adapt an async closure into a [`ToolHandler`]
///
/// The closure receives its own copy of the context.
///
/// ```
/// use serde_json::json;
/// use toolforge_tool::{handler_fn, ToolError};
///
/// let handler = handler_fn(|input, _config, _ctx| async move {
///     Ok::<_, ToolError>(json!({ "echo": input }))
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Value, Value, ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(Value, Value, ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    async fn execute(
        &self,
        input: Value,
        config: Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, ToolError> {
        (self.f)(input, config, ctx.clone()).await
    }
}
