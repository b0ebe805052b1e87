//! Execution dispatcher.
//!
//! One call to [`Dispatcher::execute`] runs the full pipeline for a
//! request: merge config, validate input and config, build the context,
//! invoke the handler, and wrap whatever happened in a [`ResponseEnvelope`].
//! The dispatcher never returns an error; every failure is an envelope.

use crate::context::ExecutionContext;
use crate::definition::ToolDefinition;
use crate::envelope::{ExecutionRequest, ResponseEnvelope, codes};
use crate::trait_::ToolError;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use toolforge_core::{ExecutionId, Timestamp};
use toolforge_schema::{ValidationError, Validator};
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Validating front door for one tool
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tool: Arc<ToolDefinition>,
    base_config: Map<String, Value>,
    timeout: Option<Duration>,
    validator: Validator,
}

/// Shallow merge: keys of `overlay` replace keys of `base`
///
/// A `null` overlay leaves `base` alone. A non-object overlay is returned
/// as is so that config validation reports it.
#[must_use]
pub fn merge_config(base: &Map<String, Value>, overlay: Value) -> Value {
    match overlay {
        Value::Null => Value::Object(base.clone()),
        Value::Object(overlay) => {
            let mut merged = base.clone();
            merged.extend(overlay);
            Value::Object(merged)
        }
        other => other,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Dispatcher {
    /// Dispatcher with no base config and no timeout
    #[must_use]
    pub fn new(tool: impl Into<Arc<ToolDefinition>>) -> Self {
        Self {
            tool: tool.into(),
            base_config: Map::new(),
            timeout: None,
            validator: Validator::new(),
        }
    }

    /// Config applied under every request's own config
    #[must_use]
    pub fn with_base_config(mut self, config: Map<String, Value>) -> Self {
        self.base_config = config;
        self
    }

    /// Abort handlers that run longer than `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the validator, e.g. to register passthrough keys
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Tool served by this dispatcher
    #[must_use]
    pub fn tool(&self) -> &ToolDefinition {
        &self.tool
    }

    /// Run one request through validation and the handler
    pub async fn execute(&self, request: ExecutionRequest) -> ResponseEnvelope {
        let execution_id = ExecutionId::new();
        let span = info_span!("execute", execution_id = %execution_id, tool = %self.tool.id());
        self.run(execution_id, request).instrument(span).await
    }

    async fn run(&self, execution_id: ExecutionId, request: ExecutionRequest) -> ResponseEnvelope {
        let started = Instant::now();
        let timestamp = Timestamp::now();
        let elapsed_ms = || u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let config = merge_config(&self.base_config, request.config);
        let input_result = self.validator.validate(self.tool.input_schema(), &request.input);
        let config_result = self.validator.validate(self.tool.config_schema(), &config);

        if !input_result.valid || !config_result.valid {
            let errors: Vec<ValidationError> = input_result
                .errors
                .into_iter()
                .map(|e| e.prefixed("input"))
                .chain(config_result.errors.into_iter().map(|e| e.prefixed("config")))
                .collect();
            let fields = errors
                .iter()
                .map(|e| format!("{}={}", e.field_path, e.code))
                .collect::<Vec<_>>()
                .join(", ");
            warn!(error_count = errors.len(), %fields, "Validation failed");
            let details = serde_json::to_value(&errors).unwrap_or(Value::Null);
            return ResponseEnvelope::error(
                execution_id,
                codes::VALIDATION_ERROR,
                format!("Validation failed with {} error(s)", errors.len()),
                elapsed_ms(),
            )
            .with_details(details);
        }

        let ctx = ExecutionContext::from_request(
            execution_id,
            self.tool.id(),
            timestamp,
            request.context,
        );
        debug!("Invoking handler");

        let call = AssertUnwindSafe(self.tool.handler().execute(
            input_result.normalized_value,
            config_result.normalized_value,
            &ctx,
        ))
        .catch_unwind();

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                    warn!(timeout_ms, "Handler timed out");
                    return ResponseEnvelope::error(
                        execution_id,
                        codes::EXECUTION_TIMEOUT,
                        format!("Execution exceeded {} ms", timeout_ms),
                        elapsed_ms(),
                    );
                }
            },
            None => call.await,
        };

        match outcome {
            Ok(Ok(output)) => {
                let elapsed = elapsed_ms();
                info!(elapsed_ms = elapsed, "Execution succeeded");
                ResponseEnvelope::success(execution_id, output, elapsed)
            }
            Ok(Err(ToolError {
                code,
                message,
                details,
            })) => {
                error!(%code, "Handler failed");
                let envelope = ResponseEnvelope::error(execution_id, code, message, elapsed_ms());
                match details {
                    Some(details) => envelope.with_details(details),
                    None => envelope,
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(panic = %message, "Handler panicked");
                ResponseEnvelope::error(
                    execution_id,
                    codes::EXECUTION_ERROR,
                    format!("Tool handler panicked: {}", message),
                    elapsed_ms(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::envelope::ExecutionStatus;
    use crate::trait_::handler_fn;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use toolforge_schema::Schema;
    use toolforge_schema::builders::*;

    fn weather_input() -> Schema {
        Schema::builder("input")
            .try_field(
                "city",
                string_field(StringOptions {
                    required: true,
                    min_length: Some(1),
                    ..StringOptions::default()
                }),
            )
            .try_field(
                "days",
                integer_field(NumberOptions {
                    min: Some(1.0),
                    max: Some(14.0),
                    default: Some(3.into()),
                    ..NumberOptions::default()
                }),
            )
            .build()
            .unwrap()
    }

    fn weather_config() -> Schema {
        Schema::builder("config")
            .try_field(
                "api_key",
                api_key_field(SecretOptions {
                    min_length: Some(8),
                    ..SecretOptions::default()
                }),
            )
            .try_field(
                "units",
                enum_field(
                    vec![json!("metric"), json!("imperial")],
                    BasicOptions {
                        default: Some(json!("metric")),
                        ..BasicOptions::default()
                    },
                ),
            )
            .build()
            .unwrap()
    }

    fn echo_tool() -> ToolDefinition {
        ToolDefinition::new(
            "weather",
            handler_fn(|input: Value, config: Value, ctx: ExecutionContext| async move {
                Ok::<_, ToolError>(json!({
                    "input": input,
                    "units": config["units"],
                    "session": ctx.session_id(),
                }))
            }),
        )
        .with_input_schema(weather_input())
        .with_config_schema(weather_config())
    }

    fn base_config() -> Map<String, Value> {
        let mut base = Map::new();
        base.insert("api_key".to_string(), json!("sk-base-0001"));
        base
    }

    #[tokio::test]
    async fn test_success_passes_normalized_values() {
        let dispatcher = Dispatcher::new(echo_tool()).with_base_config(base_config());
        let request = ExecutionRequest::new(json!({"city": "Oslo"})).with_context(RequestContext {
            session_id: Some("s-1".to_string()),
            user_id: None,
        });
        let envelope = dispatcher.execute(request).await;
        assert_eq!(envelope.status, ExecutionStatus::Success);
        assert_eq!(envelope.http_status(), 200);
        assert_eq!(
            envelope.output_data,
            Some(json!({"input": {"city": "Oslo", "days": 3}, "units": "metric", "session": "s-1"}))
        );
    }

    #[tokio::test]
    async fn test_request_config_overrides_base() {
        let dispatcher = Dispatcher::new(echo_tool()).with_base_config(base_config());
        let request = ExecutionRequest::new(json!({"city": "Oslo"})).with_config(json!({"units": "imperial"}));
        let envelope = dispatcher.execute(request).await;
        assert_eq!(envelope.output_data.unwrap()["units"], json!("imperial"));
    }

    #[tokio::test]
    async fn test_validation_errors_aggregate_input_and_config() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let tool = ToolDefinition::new(
            "weather",
            handler_fn(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, ToolError>(Value::Null) }
            }),
        )
        .with_input_schema(weather_input())
        .with_config_schema(weather_config());

        let request = ExecutionRequest::new(json!({"days": 30, "extra": true}))
            .with_config(json!({"api_key": "short"}));
        let envelope = Dispatcher::new(tool).execute(request).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(envelope.error_code.as_deref(), Some(codes::VALIDATION_ERROR));
        assert_eq!(envelope.http_status(), 400);

        let details: Vec<ValidationError> =
            serde_json::from_value(envelope.error_details.unwrap()).unwrap();
        let paths: Vec<&str> = details.iter().map(|e| e.field_path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["input.city", "input.days", "input.extra", "config.api_key"]
        );
        assert_eq!(details[3].received_value, Some(json!("[REDACTED]")));
    }

    #[tokio::test]
    async fn test_non_object_config_rejected_at_config_root() {
        let dispatcher = Dispatcher::new(echo_tool()).with_base_config(base_config());
        let request = ExecutionRequest::new(json!({"city": "Oslo"})).with_config(json!([1]));
        let envelope = dispatcher.execute(request).await;
        let details: Vec<ValidationError> =
            serde_json::from_value(envelope.error_details.unwrap()).unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].field_path, "config");
    }

    #[tokio::test]
    async fn test_handler_error_keeps_code_and_message() {
        let tool = ToolDefinition::new(
            "flaky",
            handler_fn(|_, _, _| async {
                Err::<Value, _>(ToolError::with_code("UPSTREAM_DOWN", "weather service unavailable"))
            }),
        );
        let envelope = Dispatcher::new(tool).execute(ExecutionRequest::new(json!({}))).await;
        assert_eq!(envelope.status, ExecutionStatus::Error);
        assert_eq!(envelope.error_code.as_deref(), Some("UPSTREAM_DOWN"));
        assert_eq!(envelope.error_message.as_deref(), Some("weather service unavailable"));
        assert_eq!(envelope.http_status(), 500);
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_execution_error() {
        let tool = ToolDefinition::new(
            "broken",
            handler_fn(|_, _, _| async {
                if true {
                    panic!("index out of bounds");
                }
                Ok::<_, ToolError>(Value::Null)
            }),
        );
        let envelope = Dispatcher::new(tool).execute(ExecutionRequest::new(json!({}))).await;
        assert_eq!(envelope.error_code.as_deref(), Some(codes::EXECUTION_ERROR));
        assert!(envelope.error_message.unwrap().contains("index out of bounds"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let tool = ToolDefinition::new(
            "slow",
            handler_fn(|_, _, _| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, ToolError>(Value::Null)
            }),
        );
        let envelope = Dispatcher::new(tool)
            .with_timeout(Duration::from_millis(20))
            .execute(ExecutionRequest::new(json!({})))
            .await;
        assert_eq!(envelope.error_code.as_deref(), Some(codes::EXECUTION_TIMEOUT));
        assert_eq!(envelope.error_message.as_deref(), Some("Execution exceeded 20 ms"));
        assert_eq!(envelope.http_status(), 504);
    }

    #[tokio::test]
    async fn test_each_execution_gets_its_own_id() {
        let dispatcher = Dispatcher::new(echo_tool()).with_base_config(base_config());
        let a = dispatcher.execute(ExecutionRequest::new(json!({"city": "A"}))).await;
        let b = dispatcher.execute(ExecutionRequest::new(json!({"city": "B"}))).await;
        assert_ne!(a.execution_id, b.execution_id);
    }

    #[test]
    fn test_merge_config() {
        let mut base = Map::new();
        base.insert("a".to_string(), json!(1));
        base.insert("b".to_string(), json!({"x": 1}));
        assert_eq!(merge_config(&base, Value::Null), json!({"a": 1, "b": {"x": 1}}));
        assert_eq!(
            merge_config(&base, json!({"b": {"y": 2}, "c": 3})),
            json!({"a": 1, "b": {"y": 2}, "c": 3})
        );
        assert_eq!(merge_config(&base, json!("nope")), json!("nope"));
    }
}
