//! Per-execution context handed to tool handlers.

use serde::{Deserialize, Serialize};
use toolforge_core::{ExecutionId, Timestamp};

/// Caller-supplied metadata carried by an execution request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Caller session, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Calling user, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Immutable metadata for one execution
///
/// Created by the dispatcher after validation succeeds; never shared
/// between executions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    execution_id: ExecutionId,
    tool_id: String,
    timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

impl ExecutionContext {
    /// Fresh context for a tool, stamped now
    #[must_use]
    pub fn new(tool_id: impl Into<String>) -> Self {
        Self::from_request(ExecutionId::new(), tool_id, Timestamp::now(), RequestContext::default())
    }

    pub(crate) fn from_request(
        execution_id: ExecutionId,
        tool_id: impl Into<String>,
        timestamp: Timestamp,
        request: RequestContext,
    ) -> Self {
        Self {
            execution_id,
            tool_id: tool_id.into(),
            timestamp,
            session_id: request.session_id,
            user_id: request.user_id,
        }
    }

    /// Attach a session id
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Attach a user id
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Execution identifier
    #[must_use]
    pub const fn execution_id(&self) -> ExecutionId {
        self.execution_id
    }

    /// Identifier of the tool being executed
    #[must_use]
    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    /// When the execution started
    #[must_use]
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Caller session, if any
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Calling user, if any
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}
