//! Wire types for execution requests and responses.

use crate::context::RequestContext;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use toolforge_core::{ExecutionId, Timestamp};

/// Error codes used in response envelopes
pub mod codes {
    /// Input or config failed schema validation
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    /// Request body is not a well-formed execution request
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    /// Missing or wrong credentials
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    /// Handler failed or panicked
    pub const EXECUTION_ERROR: &str = "EXECUTION_ERROR";
    /// Handler exceeded the configured timeout
    pub const EXECUTION_TIMEOUT: &str = "EXECUTION_TIMEOUT";
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Body of an execute call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Raw tool input
    #[serde(default = "empty_object")]
    pub input: Value,
    /// Raw per-request config, merged over the base config
    #[serde(default)]
    pub config: Value,
    /// Caller metadata
    #[serde(default)]
    pub context: RequestContext,
}

impl ExecutionRequest {
    /// Request with input only
    #[must_use]
    pub fn new(input: Value) -> Self {
        Self {
            input,
            config: Value::Null,
            context: RequestContext::default(),
        }
    }

    /// Set per-request config
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Set caller metadata
    #[must_use]
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }
}

/// Outcome of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Handler produced output
    Success,
    /// Request was rejected or the handler failed
    Error,
}

/// Uniform response for every execution outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Execution identifier
    pub execution_id: ExecutionId,
    /// Success or error
    pub status: ExecutionStatus,
    /// Handler output, on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<Value>,
    /// Error code, on error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Error message, on error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Structured error detail, e.g. the list of validation errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<Value>,
    /// Wall time spent on the request
    pub execution_time_ms: u64,
    /// When the response was produced
    pub timestamp: Timestamp,
}

impl ResponseEnvelope {
    /// Successful execution
    #[must_use]
    pub fn success(execution_id: ExecutionId, output: Value, execution_time_ms: u64) -> Self {
        Self {
            execution_id,
            status: ExecutionStatus::Success,
            output_data: Some(output),
            error_code: None,
            error_message: None,
            error_details: None,
            execution_time_ms,
            timestamp: Timestamp::now(),
        }
    }

    /// Failed execution
    #[must_use]
    pub fn error(
        execution_id: ExecutionId,
        code: impl Into<String>,
        message: impl Into<String>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            execution_id,
            status: ExecutionStatus::Error,
            output_data: None,
            error_code: Some(code.into()),
            error_message: Some(message.into()),
            error_details: None,
            execution_time_ms,
            timestamp: Timestamp::now(),
        }
    }

    /// Failure outside any execution, such as a malformed body
    #[must_use]
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::error(ExecutionId::new(), code, message, 0)
    }

    /// Attach structured error detail
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.error_details = Some(details);
        self
    }

    /// Whether the execution succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// HTTP status code for this envelope
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match (self.status, self.error_code.as_deref()) {
            (ExecutionStatus::Success, _) => 200,
            (_, Some(codes::VALIDATION_ERROR | codes::INVALID_REQUEST)) => 400,
            (_, Some(codes::UNAUTHORIZED)) => 401,
            (_, Some(codes::EXECUTION_TIMEOUT)) => 504,
            _ => 500,
        }
    }
}
