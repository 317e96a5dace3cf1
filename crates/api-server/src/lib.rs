//! CallSight API server.
//!
//! Axum JSON API under `/api/v1`: session auth, transcript acquisition from
//! the data vendor, dual-model analysis, and report views. Every error is
//! recovered at the request boundary and mapped to a JSON envelope.

pub mod acquisition;
pub mod analysis_routes;
pub mod auth;
pub mod auth_routes;
pub mod company_routes;
pub mod dual;
pub mod transcript_routes;
pub mod watchlist_routes;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use callsight_db::Database;
use dual::DualAnalyzer;
use llm_client::{ChatGptClient, GeminiClient};
use transcript_client::{NinjasClient, TranscriptError, TranscriptSource};

/// Shared per-request state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub analyzer: Arc<DualAnalyzer>,
}

/// Standard JSON envelope for all endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Request-boundary error taxonomy. Everything a handler can fail with maps
/// onto one of these, and each maps onto one status code.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<TranscriptError> for AppError {
    fn from(e: TranscriptError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            // Never leak internals to the client
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

/// Environment-driven configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub ninjas_api_key: String,
    pub gemini_api_key: String,
    pub openai_api_key: String,
    pub gemini_model: Option<String>,
    pub openai_model: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:callsight.db".to_string()),
            ninjas_api_key: std::env::var("NINJAS_API_KEY")
                .map_err(|_| anyhow::anyhow!("NINJAS_API_KEY not set"))?,
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY not set"))?,
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?,
            gemini_model: std::env::var("GEMINI_MODEL").ok(),
            openai_model: std::env::var("OPENAI_MODEL").ok(),
        })
    }
}

async fn status() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "CallSight API is operational."
    }))
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/api/v1/status", get(status))
        .merge(auth_routes::routes())
        .merge(company_routes::routes())
        .merge(transcript_routes::routes())
        .merge(analysis_routes::routes())
        .merge(watchlist_routes::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let db = Database::new(&config.database_url).await?;
    tracing::info!(url = %config.database_url, "database ready");

    let transcripts: Arc<dyn TranscriptSource> =
        Arc::new(NinjasClient::new(config.ninjas_api_key.clone()));
    let analyzer = Arc::new(DualAnalyzer::new(
        Arc::new(GeminiClient::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
        )),
        Arc::new(ChatGptClient::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
        )),
    ));

    let state = AppState {
        db,
        transcripts,
        analyzer,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "CallSight API listening");

    axum::serve(listener, router(state)).await?;

    Ok(())
}
