use crate::config::{AppState, ServerConfig};
use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use zenodo_mcp::ToolError;
use zenodo_sdk::ZenodoError;

mod handlers;

/// Start the API server
pub async fn serve(addr: &str, config: ServerConfig) -> Result<()> {
    let state = AppState::new(&config)?;

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/tools", get(handlers::list_tools))
        .route("/api/tools/{name}", get(handlers::get_tool).post(handlers::call_tool))
        // Middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "zenodo",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Tool failure carried to the HTTP caller
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    response: ErrorResponse,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            response: ErrorResponse::new(message),
        }
    }
}

fn status_for(err: &ToolError) -> StatusCode {
    match err.root() {
        ToolError::NotFound(_) | ToolError::FileNotFound { .. } => StatusCode::NOT_FOUND,
        ToolError::InvalidArguments { .. }
        | ToolError::UnsupportedFormat(_)
        | ToolError::InsufficientRecords { .. } => StatusCode::BAD_REQUEST,
        ToolError::Upstream(ZenodoError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
        ToolError::Upstream(e) if e.is_not_found() => StatusCode::NOT_FOUND,
        ToolError::Upstream(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        let status = status_for(&err);

        let mut causes = Vec::new();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        let response = if causes.is_empty() {
            ErrorResponse::new(err.to_string())
        } else {
            ErrorResponse::with_details(err.to_string(), causes.join(": "))
        };
        Self { status, response }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
