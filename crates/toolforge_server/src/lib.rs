//! HTTP hosting for toolforge tools.
//!
//! Exposes one tool over three routes:
//!
//! - `POST /execute` runs the tool through the validating dispatcher
//! - `GET /health` reports liveness and never requires authentication
//! - `GET /schema` describes the tool with JSON Schema projections

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;

pub use api::router;
pub use auth::{ApiKeyAuth, AuthError};
pub use config::ServerConfig;
pub use error::ServerError;

use toolforge_tool::{Dispatcher, ToolDefinition};
use tracing::info;

/// Build the dispatcher a server would use for `tool`
#[must_use]
pub fn dispatcher(tool: ToolDefinition, config: &ServerConfig) -> Dispatcher {
    let dispatcher = Dispatcher::new(tool).with_base_config(config.base_config.clone());
    match config.timeout {
        Some(timeout) => dispatcher.with_timeout(timeout),
        None => dispatcher,
    }
}

/// Serve one tool until Ctrl-C
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be bound, or
/// [`ServerError::Serve`] if the server loop fails
pub async fn serve(tool: ToolDefinition, config: ServerConfig) -> Result<(), ServerError> {
    let tool_id = tool.id().to_string();
    let app = router(dispatcher(tool, &config), &config);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;

    info!(
        tool = %tool_id,
        bind = %config.bind,
        auth = config.api_key.is_some(),
        "Serving tool"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        // Without a signal handler, run until killed
        Err(_) => std::future::pending::<()>().await,
    }
}
