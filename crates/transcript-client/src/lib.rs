//! Client for the earnings-transcript data vendor (API Ninjas).
//!
//! Two endpoints are consumed: `earningstranscript` keyed by
//! ticker/year/quarter, and `logo` for a basic company profile. Both return
//! either a JSON object or a list whose first element is the match; an empty
//! list means no data. The [`TranscriptSource`] trait is the seam the server
//! depends on, so acquisition logic is testable without the network.

pub mod error;

pub use error::{TranscriptError, TranscriptResult};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const NINJAS_BASE: &str = "https://api.api-ninjas.com/v1";

/// A fetched earnings-call transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptPayload {
    pub call_date: Option<NaiveDate>,
    pub transcript: String,
}

/// Basic company profile (name and logo) for implicit company creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub ticker: String,
    pub name: String,
    pub logo_url: Option<String>,
}

/// External source of transcripts and company profiles.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for one fiscal quarter. `Ok(None)` means the
    /// vendor has no transcript for that key.
    async fn earnings_transcript(
        &self,
        ticker: &str,
        year: i64,
        quarter: i64,
    ) -> TranscriptResult<Option<TranscriptPayload>>;

    /// Fetch a basic company profile. `Ok(None)` means the ticker is unknown.
    async fn company_profile(&self, ticker: &str) -> TranscriptResult<Option<CompanyProfile>>;
}

/// HTTP client for API Ninjas.
#[derive(Clone)]
pub struct NinjasClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NinjasClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, NINJAS_BASE.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// GET an endpoint and unwrap the vendor's object-or-list envelope.
    async fn get_first(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> TranscriptResult<Option<Value>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, "fetching from transcript provider");

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranscriptError::ServiceUnavailable(format!(
                "Status: {}",
                response.status()
            )));
        }

        let body = response.json::<Value>().await?;
        match body {
            Value::Array(items) => Ok(items.into_iter().next()),
            Value::Object(_) => Ok(Some(body)),
            other => Err(TranscriptError::InvalidResponse(format!(
                "unexpected top-level response: {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl TranscriptSource for NinjasClient {
    async fn earnings_transcript(
        &self,
        ticker: &str,
        year: i64,
        quarter: i64,
    ) -> TranscriptResult<Option<TranscriptPayload>> {
        let params = [
            ("ticker", ticker.to_uppercase()),
            ("year", year.to_string()),
            ("quarter", quarter.to_string()),
        ];

        let data = self.get_first("earningstranscript", &params).await?;
        Ok(data.as_ref().and_then(transcript_from_value))
    }

    async fn company_profile(&self, ticker: &str) -> TranscriptResult<Option<CompanyProfile>> {
        let params = [("ticker", ticker.to_uppercase())];

        let data = self.get_first("logo", &params).await?;
        Ok(data.as_ref().and_then(profile_from_value))
    }
}

/// Extract a transcript payload; a missing or empty transcript body counts
/// as "not found" rather than an error.
fn transcript_from_value(value: &Value) -> Option<TranscriptPayload> {
    let transcript = value
        .get("transcript")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    let call_date = value
        .get("date")
        .and_then(|v| v.as_str())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

    Some(TranscriptPayload {
        call_date,
        transcript: transcript.to_string(),
    })
}

fn profile_from_value(value: &Value) -> Option<CompanyProfile> {
    let name = value.get("name").and_then(|v| v.as_str())?;
    let ticker = value.get("ticker").and_then(|v| v.as_str())?;
    let logo_url = value
        .get("image")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Some(CompanyProfile {
        ticker: ticker.to_uppercase(),
        name: name.to_string(),
        logo_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transcript_from_value() {
        let value = json!({
            "date": "2024-01-30",
            "transcript": "Operator: Good afternoon...",
            "transcript_split": [{"speaker": "Operator", "text": "Good afternoon..."}]
        });

        let payload = transcript_from_value(&value).unwrap();
        assert_eq!(
            payload.call_date,
            Some(NaiveDate::from_ymd_opt(2024, 1, 30).unwrap())
        );
        assert_eq!(payload.transcript, "Operator: Good afternoon...");
    }

    #[test]
    fn test_transcript_missing_text_is_not_found() {
        assert!(transcript_from_value(&json!({"date": "2024-01-30"})).is_none());
        assert!(transcript_from_value(&json!({"transcript": "   "})).is_none());
    }

    #[test]
    fn test_transcript_bad_date_tolerated() {
        let value = json!({"date": "Jan 30", "transcript": "text"});
        let payload = transcript_from_value(&value).unwrap();
        assert_eq!(payload.call_date, None);
    }

    #[test]
    fn test_profile_from_value() {
        let value = json!({"name": "Apple Inc.", "ticker": "aapl", "image": "https://x/logo.png"});
        let profile = profile_from_value(&value).unwrap();
        assert_eq!(profile.ticker, "AAPL");
        assert_eq!(profile.name, "Apple Inc.");
        assert_eq!(profile.logo_url.as_deref(), Some("https://x/logo.png"));
    }

    #[test]
    fn test_profile_requires_name_and_ticker() {
        assert!(profile_from_value(&json!({"image": "https://x/logo.png"})).is_none());
    }
}
