//! HTTP routes.

use crate::auth::ApiKeyAuth;
use crate::config::ServerConfig;
use axum::{Json, Router};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::json;
use std::sync::Arc;
use toolforge_core::Timestamp;
use toolforge_tool::{Dispatcher, ExecutionRequest, ResponseEnvelope, codes};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state for the route handlers
#[derive(Debug, Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    auth: Arc<ApiKeyAuth>,
}

/// Build the router for one dispatcher
///
/// The dispatcher should already carry the base config and timeout; this
/// function applies the HTTP-level settings (auth, body limit, CORS).
pub fn router(dispatcher: Dispatcher, config: &ServerConfig) -> Router {
    let auth = ApiKeyAuth::new(config.api_key.clone());
    if !auth.is_enabled() {
        info!("No API key configured; /execute and /schema are open");
    }
    let state = AppState {
        dispatcher: Arc::new(dispatcher),
        auth: Arc::new(auth),
    };
    let router = Router::new()
        .route("/execute", post(execute))
        .route("/health", get(health))
        .route("/schema", get(schema))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http());
    let router = if config.permissive_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };
    router.with_state(state)
}

fn envelope_response(envelope: ResponseEnvelope) -> Response {
    let status = StatusCode::from_u16(envelope.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope)).into_response()
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    state.auth.check(headers).map_err(|e| {
        warn!(reason = %e, "Rejected unauthenticated request");
        envelope_response(ResponseEnvelope::rejected(codes::UNAUTHORIZED, e.to_string()))
    })
}

async fn execute(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) => {
            warn!(status = %rejection.status(), "Rejected request body");
            let envelope = ResponseEnvelope::rejected(codes::INVALID_REQUEST, rejection.body_text());
            return (rejection.status(), Json(envelope)).into_response();
        }
    };

    let request: ExecutionRequest = match serde_json::from_slice(&bytes) {
        Ok(request) => request,
        Err(e) => {
            warn!(line = e.line(), column = e.column(), "Malformed execution request");
            return envelope_response(ResponseEnvelope::rejected(
                codes::INVALID_REQUEST,
                format!(
                    "Malformed request body at line {}, column {}",
                    e.line(),
                    e.column()
                ),
            ));
        }
    };

    envelope_response(state.dispatcher.execute(request).await)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let tool = state.dispatcher.tool();
    Json(json!({
        "status": "healthy",
        "tool": tool.id(),
        "version": tool.version(),
        "timestamp": Timestamp::now(),
    }))
}

async fn schema(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    Json(state.dispatcher.tool().describe()).into_response()
}
