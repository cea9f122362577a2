//! HTTP tool server.
//!
//! Exposes the capability table over a JSON HTTP API so an external agent
//! loop can discover and call tools.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/tools/list` | List all registered tools with schemas |
//! | `POST` | `/tools/{name}` | Call any registered tool by name |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "embedding_error", "message": "embedding provider failed: ..." } }
//! ```
//!
//! | Code | Status |
//! |------|--------|
//! | `bad_request`, `io_error`, `parse_error`, `config_error` | 400 |
//! | `not_found`, `empty_index` | 404 |
//! | `embedding_mismatch` | 409 |
//! | `embedding_error` | 502 |
//! | `storage_error`, `tool_error` | 500 |
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use docindex_core::IndexError;

use crate::action::Action;
use crate::config::Config;
use crate::traits::{ToolContext, ToolRegistry};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    ctx: ToolContext,
    tools: Arc<ToolRegistry>,
}

/// Build the router over a tool context and registry.
pub fn router(ctx: ToolContext, tools: Arc<ToolRegistry>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tools/list", get(handle_list_tools))
        .route("/tools/{name}", post(handle_tool_call))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { ctx, tools })
}

/// Serve on an already-bound listener until the process is terminated.
pub async fn serve(
    listener: TcpListener,
    ctx: ToolContext,
    tools: Arc<ToolRegistry>,
) -> anyhow::Result<()> {
    axum::serve(listener, router(ctx, tools)).await?;
    Ok(())
}

/// Starts the tool server on `[server].bind` with the built-in tools.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let ctx = ToolContext::open(config.clone()).await?;
    let tools = Arc::new(ToolRegistry::with_builtins());

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind = %bind_addr, tools = tools.len(), "tool server listening");
    println!("Tool server listening on http://{}", bind_addr);

    serve(listener, ctx, tools).await
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn app_error(status: StatusCode, code: &str, message: impl Into<String>) -> AppError {
    AppError {
        status,
        code: code.to_string(),
        message: message.into(),
    }
}

fn index_error_status(err: &IndexError) -> StatusCode {
    match err {
        IndexError::Io { .. } | IndexError::Parse { .. } | IndexError::Config(_) => {
            StatusCode::BAD_REQUEST
        }
        IndexError::EmptyIndex => StatusCode::NOT_FOUND,
        IndexError::EmbeddingMismatch { .. } => StatusCode::CONFLICT,
        IndexError::Embedding(_) => StatusCode::BAD_GATEWAY,
        IndexError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a tool failure to a response, using the index error taxonomy when
/// the failure carries an [`IndexError`].
fn classify_tool_error(tool_name: &str, err: anyhow::Error) -> AppError {
    let message = format!("{}: {:#}", tool_name, err);
    match err.downcast_ref::<IndexError>() {
        Some(index_err) => app_error(index_error_status(index_err), index_err.kind(), message),
        None => app_error(StatusCode::INTERNAL_SERVER_ERROR, "tool_error", message),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /tools/list ============

async fn handle_list_tools(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "tools": state.tools.list() }))
}

// ============ POST /tools/{name} ============

/// Unified tool dispatch.
///
/// Returns `404` if the tool is not registered, `400` if the arguments do
/// not form a valid action, and the taxonomy status for execution errors.
async fn handle_tool_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tool = state.tools.find(&name).ok_or_else(|| {
        app_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no tool registered with name: {}", name),
        )
    })?;

    let result = if Action::TOOL_NAMES.contains(&name.as_str()) {
        let action = Action::from_call(&name, params)
            .map_err(|e| app_error(StatusCode::BAD_REQUEST, "bad_request", format!("{:#}", e)))?;
        state.tools.dispatch(&action, &state.ctx).await
    } else {
        tool.execute(params, &state.ctx).await
    };

    match result {
        Ok(value) => Ok(Json(serde_json::json!({ "result": value }))),
        Err(e) => {
            tracing::warn!(tool = %name, error = %e, "tool call failed");
            Err(classify_tool_error(&name, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_errors_map_to_codes() {
        let err = classify_tool_error(
            "retrieve",
            anyhow::Error::new(IndexError::Embedding("timeout".to_string())),
        );
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.code, "embedding_error");
        assert!(err.message.starts_with("retrieve: "));

        let err = classify_tool_error(
            "ingest",
            anyhow::Error::new(IndexError::io("/tmp/x", "No such file")).context("loading"),
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "io_error");

        let err = classify_tool_error("weather", anyhow::anyhow!("OPENWEATHER_API_KEY not set"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "tool_error");
    }
}
