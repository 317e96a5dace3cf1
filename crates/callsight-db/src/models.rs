use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use analysis_core::ModelAnalysis;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompanyRow {
    pub ticker: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TranscriptRow {
    pub id: i64,
    pub ticker: String,
    pub fiscal_year: i64,
    pub fiscal_quarter: i64,
    pub call_date: Option<String>,
    pub raw_text: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WatchlistRow {
    pub id: i64,
    pub user_id: i64,
    pub ticker: String,
    pub created_at: DateTime<Utc>,
}

/// Flat report row matching the `analysis_reports` table. Per-model columns
/// are all nullable: a provider failure leaves its side absent.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReportRow {
    pub id: i64,
    pub user_id: i64,
    pub transcript_id: i64,

    pub gemini_summary: Option<String>,
    pub gemini_sentiment: Option<String>,
    pub gemini_confidence_score: Option<i64>,
    pub gemini_evasiveness_score: Option<i64>,
    pub gemini_key_topics: Option<String>,
    pub gemini_red_flags: Option<String>,
    pub gemini_model: Option<String>,
    pub gemini_error: Option<String>,
    pub gemini_raw_response: Option<String>,

    pub chatgpt_summary: Option<String>,
    pub chatgpt_sentiment: Option<String>,
    pub chatgpt_confidence_score: Option<i64>,
    pub chatgpt_evasiveness_score: Option<i64>,
    pub chatgpt_key_topics: Option<String>,
    pub chatgpt_red_flags: Option<String>,
    pub chatgpt_model: Option<String>,
    pub chatgpt_error: Option<String>,
    pub chatgpt_raw_response: Option<String>,

    pub comparison_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One provider's contribution to a new report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewReportSide {
    pub summary: Option<String>,
    pub sentiment: Option<String>,
    pub confidence_score: Option<i64>,
    pub evasiveness_score: Option<i64>,
    /// JSON-encoded array of strings.
    pub key_topics: Option<String>,
    /// JSON-encoded array of strings.
    pub red_flags: Option<String>,
    pub model: Option<String>,
    pub error: Option<String>,
    /// JSON-encoded raw provider response.
    pub raw_response: Option<String>,
}

impl NewReportSide {
    /// Flatten a normalized analysis into nullable columns.
    pub fn from_analysis(
        analysis: &ModelAnalysis,
        model: Option<String>,
        error: Option<String>,
        raw_response: Option<String>,
    ) -> Self {
        Self {
            summary: analysis.summary.clone(),
            sentiment: analysis.overall_sentiment.map(|s| s.as_str().to_string()),
            confidence_score: analysis.management_confidence_score,
            evasiveness_score: analysis.evasiveness_score,
            key_topics: encode_list(&analysis.key_topics),
            red_flags: encode_list(&analysis.red_flags),
            model,
            error,
            raw_response,
        }
    }
}

/// Insert payload for `analysis_reports`.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub user_id: i64,
    pub transcript_id: i64,
    pub gemini: NewReportSide,
    pub chatgpt: NewReportSide,
    pub comparison_notes: Option<String>,
}

fn encode_list(items: &[String]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        serde_json::to_string(items).ok()
    }
}

/// Decode a JSON-encoded string list column; absent or corrupt → empty.
pub fn decode_list(column: Option<&str>) -> Vec<String> {
    column
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}
