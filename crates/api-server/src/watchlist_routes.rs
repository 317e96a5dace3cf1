//! Per-user watchlist endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;

use callsight_db::WatchlistRow;

use crate::auth::AuthUser;
use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct AddWatchlistRequest {
    pub ticker: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/watchlists", get(list_watchlist).post(add_to_watchlist))
        .route("/api/v1/watchlists/:ticker/delete", post(remove_from_watchlist))
}

async fn list_watchlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<WatchlistRow>>>, AppError> {
    let items = state.db.watchlist_for_user(auth.id).await?;
    Ok(Json(ApiResponse::success(items)))
}

async fn add_to_watchlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<AddWatchlistRequest>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let ticker = req.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(AppError::Validation("Ticker must not be empty.".to_string()));
    }

    // Duplicate adds are fine, the insert is idempotent
    state.db.add_watchlist_item(auth.id, &ticker).await?;
    Ok(Json(ApiResponse::success(format!(
        "{} added to watchlist.",
        ticker
    ))))
}

async fn remove_from_watchlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let ticker = ticker.to_uppercase();
    if !state.db.remove_watchlist_item(auth.id, &ticker).await? {
        return Err(AppError::NotFound(format!("{} is not on your watchlist.", ticker)));
    }
    Ok(Json(ApiResponse::success(format!(
        "{} removed from watchlist.",
        ticker
    ))))
}
