//! Transcript acquisition and lookup endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use callsight_db::TranscriptRow;

use crate::acquisition::acquire_transcript;
use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct AcquireRequest {
    pub ticker: String,
    pub year: i64,
    pub quarter: i64,
}

#[derive(Serialize)]
pub struct AcquireResponse {
    pub transcript: TranscriptRow,
    pub already_existed: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/transcripts", post(acquire))
        .route("/api/v1/transcripts/:id", get(get_transcript))
        .route("/api/v1/transcripts/:id/delete", post(delete_transcript))
}

async fn acquire(
    State(state): State<AppState>,
    Json(req): Json<AcquireRequest>,
) -> Result<Json<ApiResponse<AcquireResponse>>, AppError> {
    let acquired = acquire_transcript(
        &state.db,
        state.transcripts.as_ref(),
        &req.ticker,
        req.year,
        req.quarter,
    )
    .await?;

    Ok(Json(ApiResponse::success(AcquireResponse {
        transcript: acquired.transcript,
        already_existed: acquired.already_existed,
    })))
}

async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TranscriptRow>>, AppError> {
    let transcript = state
        .db
        .transcript_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transcript {} not found.", id)))?;
    Ok(Json(ApiResponse::success(transcript)))
}

async fn delete_transcript(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    // Reports referencing the transcript go with it (cascade)
    if !state.db.delete_transcript(id).await? {
        return Err(AppError::NotFound(format!("Transcript {} not found.", id)));
    }
    tracing::info!(id, "transcript deleted");
    Ok(Json(ApiResponse::success(format!("Transcript {} deleted.", id))))
}
