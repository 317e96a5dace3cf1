//! Registration, login, logout, and the current-user endpoint.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use callsight_db::UserRow;

use crate::auth::{
    extract_token, generate_token, hash_password, hash_token, verify_password, AuthUser,
};
use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for UserView {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserView,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/me", get(me))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    let username = req.username.trim();
    if username.len() < 3 {
        return Err(AppError::Validation(
            "Username must be at least 3 characters.".to_string(),
        ));
    }
    if req.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters.".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user = state
        .db
        .create_user(username, req.email.as_deref(), &password_hash)
        .await?
        .ok_or_else(|| {
            AppError::Validation("Username or email is already taken.".to_string())
        })?;

    tracing::info!(username = %user.username, "user registered");

    let session = open_session(&state, user).await?;
    Ok(Json(ApiResponse::success(session)))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    let user = state
        .db
        .user_by_username(req.username.trim())
        .await?
        .filter(|u| verify_password(&req.password, &u.password_hash))
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password.".to_string()))?;

    state.db.touch_last_login(user.id).await?;

    let session = open_session(&state, user).await?;
    Ok(Json(ApiResponse::success(session)))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<String>>, AppError> {
    // Middleware already validated the token; re-extract it to end the session
    if let Some(token) = extract_token(&headers) {
        state.db.delete_session(&hash_token(&token)).await?;
    }
    Ok(Json(ApiResponse::success("Logged out.".to_string())))
}

async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserView>>, AppError> {
    let user = state
        .db
        .user_by_id(auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
    Ok(Json(ApiResponse::success(user.into())))
}

async fn open_session(state: &AppState, user: UserRow) -> Result<SessionResponse, AppError> {
    let token = generate_token();
    state.db.create_session(&hash_token(&token), user.id).await?;
    Ok(SessionResponse {
        token,
        user: user.into(),
    })
}
