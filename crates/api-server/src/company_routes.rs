//! Read-only company endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use callsight_db::{CompanyRow, TranscriptRow};

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct CompanyQuery {
    pub search: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/companies", get(list_companies))
        .route("/api/v1/companies/:ticker", get(get_company))
        .route(
            "/api/v1/companies/:ticker/transcripts",
            get(list_company_transcripts),
        )
}

async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<ApiResponse<Vec<CompanyRow>>>, AppError> {
    let companies = state.db.list_companies(query.search.as_deref()).await?;
    Ok(Json(ApiResponse::success(companies)))
}

async fn get_company(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<CompanyRow>>, AppError> {
    let ticker = ticker.to_uppercase();
    let company = state
        .db
        .company_by_ticker(&ticker)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {} not found.", ticker)))?;
    Ok(Json(ApiResponse::success(company)))
}

async fn list_company_transcripts(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<Vec<TranscriptRow>>>, AppError> {
    let ticker = ticker.to_uppercase();
    if state.db.company_by_ticker(&ticker).await?.is_none() {
        return Err(AppError::NotFound(format!("Company {} not found.", ticker)));
    }

    let transcripts = state.db.transcripts_for_company(&ticker).await?;
    Ok(Json(ApiResponse::success(transcripts)))
}
