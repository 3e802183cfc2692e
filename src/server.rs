//! REST server.
//!
//! Exposes the retriever over a small JSON API, with the MCP streamable
//! HTTP transport mounted alongside it at `/mcp`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness, version, and corpus size (always 200) |
//! | `GET`  | `/ready` | 200 once the policy document is indexed, 503 before |
//! | `POST` | `/query` | Retrieve passages for `{"prompt", "k"?}` |
//! | `POST` | `/prompt` | Render the LLM prompt for `{"prompt", "k"?}` |
//! | `*`    | `/mcp` | MCP streamable HTTP endpoint |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "invalid_query", "message": "invalid query: query text must not be empty" } }
//! ```
//!
//! Error codes: `invalid_query` (400), `not_ready` (503),
//! `embedding_failed` (502), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser-based
//! clients can call the API directly.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::error::RetrieverError;
use crate::mcp::{http_service, PolicyMcpServer};
use crate::models::RetrievedPassage;
use crate::prompt::build_llm_prompt;
use crate::retriever::PolicyRetriever;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    retriever: Arc<PolicyRetriever>,
    /// Passages returned when a request omits `k`.
    default_k: usize,
}

/// Build the full router: REST routes, `/mcp`, and CORS.
pub fn router(retriever: Arc<PolicyRetriever>, default_k: usize) -> Router {
    let mcp = http_service(PolicyMcpServer::new(retriever.clone(), default_k));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/query", post(handle_query))
        .route("/prompt", post(handle_prompt))
        .with_state(AppState {
            retriever,
            default_k,
        })
        .nest_service("/mcp", mcp)
        .layer(cors)
}

/// Bind to `bind` and serve until Ctrl-C.
pub async fn run_server(
    bind: &str,
    retriever: Arc<PolicyRetriever>,
    default_k: usize,
) -> anyhow::Result<()> {
    let app = router(retriever, default_k);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %bind, "HTTP server listening (REST + /mcp)");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
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

/// Converts into a JSON error response.
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

impl From<RetrieverError> for AppError {
    fn from(err: RetrieverError) -> Self {
        let status = match &err {
            RetrieverError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            RetrieverError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            RetrieverError::Embedding(_) => StatusCode::BAD_GATEWAY,
            RetrieverError::IngestionFailure { .. } | RetrieverError::AlreadyInitialized => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let code = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal"
        } else {
            err.code()
        };
        if status.is_server_error() {
            warn!(code, error = %err, "request failed");
        }
        AppError {
            status,
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

/// Malformed request bodies keep the JSON error contract.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_query".to_string(),
            message: format!("invalid request body: {}", rejection.body_text()),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    /// `"ok"` when the document is indexed, `"degraded"` otherwise.
    status: &'static str,
    ready: bool,
    version: &'static str,
    passages: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let ready = state.retriever.is_ready();
    Json(HealthResponse {
        status: if ready { "ok" } else { "degraded" },
        ready,
        version: env!("CARGO_PKG_VERSION"),
        passages: state.retriever.passage_count(),
    })
}

// ============ GET /ready ============

async fn handle_ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    if state.retriever.is_ready() {
        Ok(Json(serde_json::json!({ "ready": true })))
    } else {
        Err(RetrieverError::NotReady.into())
    }
}

// ============ POST /query ============

#[derive(Deserialize)]
struct QueryRequest {
    prompt: String,
    #[serde(default)]
    k: Option<usize>,
}

#[derive(Serialize)]
struct QueryResponse {
    /// Passage texts joined by newlines.
    result: String,
    passages: Vec<RetrievedPassage>,
}

async fn handle_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, AppError> {
    let Json(req) = payload?;
    let k = req.k.unwrap_or(state.default_k);
    let passages = state.retriever.query(&req.prompt, k).await?;
    let result = passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Json(QueryResponse { result, passages }))
}

// ============ POST /prompt ============

#[derive(Serialize)]
struct PromptResponse {
    prompt: String,
}

async fn handle_prompt(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, AppError> {
    let Json(req) = payload?;
    let k = req.k.unwrap_or(state.default_k);
    let context = state.retriever.query_text(&req.prompt, k).await?;
    Ok(Json(PromptResponse {
        prompt: build_llm_prompt(&req.prompt, &context),
    }))
}
