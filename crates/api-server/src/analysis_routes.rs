//! Dual-analysis and report endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use analysis_core::Provider;
use callsight_db::{decode_list, NewReport, NewReportSide, ReportRow};

use crate::auth::AuthUser;
use crate::dual::ProviderOutcome;
use crate::{ApiResponse, AppError, AppState};

/// Default shown when a model produced no summary.
const NO_SUMMARY: &str = "No summary provided.";
/// Default shown for any absent scalar field.
const NOT_AVAILABLE: &str = "N/A";

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub transcript_id: i64,
    pub prompt: Option<String>,
}

/// One model's side of a rendered report, defaults substituted.
#[derive(Serialize)]
pub struct ReportSideView {
    pub provider: String,
    pub model: String,
    pub summary: String,
    pub overall_sentiment: String,
    pub management_confidence_score: Option<i64>,
    pub evasiveness_score: Option<i64>,
    pub key_topics: Vec<String>,
    pub red_flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Rendered comparison report. The notes section is omitted entirely when
/// no comparison notes exist.
#[derive(Serialize)]
pub struct ReportView {
    pub id: i64,
    pub transcript_id: i64,
    pub gemini: ReportSideView,
    pub chatgpt: ReportSideView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReportView {
    pub fn from_row(row: &ReportRow) -> Self {
        Self {
            id: row.id,
            transcript_id: row.transcript_id,
            gemini: ReportSideView {
                provider: Provider::Gemini.as_str().to_string(),
                model: or_na(row.gemini_model.as_deref()),
                summary: row
                    .gemini_summary
                    .clone()
                    .unwrap_or_else(|| NO_SUMMARY.to_string()),
                overall_sentiment: or_na(row.gemini_sentiment.as_deref()),
                management_confidence_score: row.gemini_confidence_score,
                evasiveness_score: row.gemini_evasiveness_score,
                key_topics: decode_list(row.gemini_key_topics.as_deref()),
                red_flags: decode_list(row.gemini_red_flags.as_deref()),
                error: row.gemini_error.clone(),
            },
            chatgpt: ReportSideView {
                provider: Provider::ChatGpt.as_str().to_string(),
                model: or_na(row.chatgpt_model.as_deref()),
                summary: row
                    .chatgpt_summary
                    .clone()
                    .unwrap_or_else(|| NO_SUMMARY.to_string()),
                overall_sentiment: or_na(row.chatgpt_sentiment.as_deref()),
                management_confidence_score: row.chatgpt_confidence_score,
                evasiveness_score: row.chatgpt_evasiveness_score,
                key_topics: decode_list(row.chatgpt_key_topics.as_deref()),
                red_flags: decode_list(row.chatgpt_red_flags.as_deref()),
                error: row.chatgpt_error.clone(),
            },
            comparison_notes: row.comparison_notes.clone(),
            created_at: row.created_at,
        }
    }
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/analysis", post(run_analysis).get(list_reports))
        .route("/api/v1/reports/:id", get(get_report))
        .route("/api/v1/reports/:id/raw/:provider", get(get_raw_response))
        .route("/api/v1/reports/:id/delete", post(delete_report))
}

async fn run_analysis(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<ReportView>>, AppError> {
    let transcript = state
        .db
        .transcript_by_id(req.transcript_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Transcript {} not found.", req.transcript_id))
        })?;

    tracing::info!(
        user = %auth.username,
        transcript_id = transcript.id,
        ticker = %transcript.ticker,
        "running dual analysis"
    );

    let result = state
        .analyzer
        .analyze(&transcript.raw_text, req.prompt.as_deref())
        .await;

    let report = NewReport {
        user_id: auth.id,
        transcript_id: transcript.id,
        gemini: side_from_outcome(&result.gemini),
        chatgpt: side_from_outcome(&result.chatgpt),
        comparison_notes: result.comparison_notes,
    };

    let row = state.db.insert_report(&report).await?;
    Ok(Json(ApiResponse::success(ReportView::from_row(&row))))
}

fn side_from_outcome(outcome: &ProviderOutcome) -> NewReportSide {
    NewReportSide::from_analysis(
        &outcome.analysis,
        outcome.model.clone(),
        outcome.error.clone(),
        outcome
            .raw_response
            .as_ref()
            .and_then(|v| serde_json::to_string(v).ok()),
    )
}

async fn list_reports(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<ReportView>>>, AppError> {
    let rows = state.db.reports_for_user(auth.id).await?;
    let views = rows.iter().map(ReportView::from_row).collect();
    Ok(Json(ApiResponse::success(views)))
}

async fn get_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ReportView>>, AppError> {
    let row = owned_report(&state, &auth, id).await?;
    Ok(Json(ApiResponse::success(ReportView::from_row(&row))))
}

async fn get_raw_response(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((id, provider)): Path<(i64, String)>,
) -> Result<Json<Value>, AppError> {
    let provider = Provider::from_str(&provider).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown provider '{}'; expected 'gemini' or 'chatgpt'.",
            provider
        ))
    })?;

    let row = owned_report(&state, &auth, id).await?;
    let raw = match provider {
        Provider::Gemini => row.gemini_raw_response,
        Provider::ChatGpt => row.chatgpt_raw_response,
    };

    let raw = raw.ok_or_else(|| {
        AppError::NotFound(format!(
            "No raw {} response stored for report {}.",
            provider, id
        ))
    })?;

    let value = serde_json::from_str(&raw)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt raw response: {}", e)))?;
    Ok(Json(value))
}

async fn delete_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    if !state.db.delete_report_for_user(id, auth.id).await? {
        return Err(AppError::NotFound(format!("Report {} not found.", id)));
    }
    Ok(Json(ApiResponse::success(format!("Report {} deleted.", id))))
}

/// Owner-scoped report fetch: someone else's report reads as absent.
async fn owned_report(state: &AppState, auth: &AuthUser, id: i64) -> Result<ReportRow, AppError> {
    state
        .db
        .report_for_user(id, auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found.", id)))
}
