//! Transcript acquisition glue.
//!
//! Idempotent by (ticker, year, quarter): an existing row short-circuits
//! before any vendor call. A lost insert race resolves to the winner's row.

use callsight_db::{Database, TranscriptRow};
use transcript_client::TranscriptSource;

use crate::AppError;

const MIN_YEAR: i64 = 1990;
const MAX_YEAR: i64 = 2100;

#[derive(Debug)]
pub struct AcquiredTranscript {
    pub transcript: TranscriptRow,
    pub already_existed: bool,
}

/// Fetch-or-return the transcript for one fiscal quarter.
pub async fn acquire_transcript(
    db: &Database,
    source: &dyn TranscriptSource,
    ticker: &str,
    year: i64,
    quarter: i64,
) -> Result<AcquiredTranscript, AppError> {
    let ticker = ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(AppError::Validation("Ticker must not be empty.".to_string()));
    }
    if !(1..=4).contains(&quarter) {
        return Err(AppError::Validation(
            "Quarter must be between 1 and 4.".to_string(),
        ));
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::Validation(format!(
            "Year must be between {} and {}.",
            MIN_YEAR, MAX_YEAR
        )));
    }

    // Idempotent acquisition: an existing transcript means no vendor call
    if let Some(existing) = db.transcript_by_key(&ticker, year, quarter).await? {
        tracing::debug!(%ticker, year, quarter, id = existing.id, "transcript already stored");
        return Ok(AcquiredTranscript {
            transcript: existing,
            already_existed: true,
        });
    }

    let payload = source
        .earnings_transcript(&ticker, year, quarter)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No transcript found for {} Q{} {}.",
                ticker, quarter, year
            ))
        })?;

    // Company creation is implicit; the profile lookup is best-effort and
    // falls back to the ticker as the name
    let profile = match source.company_profile(&ticker).await {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(%ticker, error = %e, "company profile lookup failed");
            None
        }
    };
    match profile {
        Some(p) => {
            db.ensure_company(&ticker, &p.name, p.logo_url.as_deref())
                .await?
        }
        None => db.ensure_company(&ticker, &ticker, None).await?,
    };

    let call_date = payload.call_date.map(|d| d.to_string());
    let (transcript, already_existed) = db
        .insert_transcript(
            &ticker,
            year,
            quarter,
            call_date.as_deref(),
            &payload.transcript,
            "api-ninjas",
        )
        .await?;

    tracing::info!(%ticker, year, quarter, id = transcript.id, already_existed, "transcript acquired");

    Ok(AcquiredTranscript {
        transcript,
        already_existed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use transcript_client::{
        CompanyProfile, TranscriptError, TranscriptPayload, TranscriptResult,
    };

    struct MockSource {
        transcript: Option<String>,
        profile: Option<CompanyProfile>,
        fail_transcript: bool,
        fail_profile: bool,
        transcript_calls: AtomicUsize,
    }

    impl MockSource {
        fn with_transcript(text: &str) -> Self {
            Self {
                transcript: Some(text.to_string()),
                profile: Some(CompanyProfile {
                    ticker: "AAPL".into(),
                    name: "Apple Inc.".into(),
                    logo_url: None,
                }),
                fail_transcript: false,
                fail_profile: false,
                transcript_calls: AtomicUsize::new(0),
            }
        }

        fn empty() -> Self {
            Self {
                transcript: None,
                profile: None,
                fail_transcript: false,
                fail_profile: false,
                transcript_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TranscriptSource for MockSource {
        async fn earnings_transcript(
            &self,
            _ticker: &str,
            _year: i64,
            _quarter: i64,
        ) -> TranscriptResult<Option<TranscriptPayload>> {
            self.transcript_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transcript {
                return Err(TranscriptError::ServiceUnavailable("Status: 502".into()));
            }
            Ok(self.transcript.as_ref().map(|t| TranscriptPayload {
                call_date: None,
                transcript: t.clone(),
            }))
        }

        async fn company_profile(
            &self,
            _ticker: &str,
        ) -> TranscriptResult<Option<CompanyProfile>> {
            if self.fail_profile {
                return Err(TranscriptError::ServiceUnavailable("Status: 502".into()));
            }
            Ok(self.profile.clone())
        }
    }

    #[tokio::test]
    async fn test_acquisition_creates_company_and_transcript() {
        let db = Database::in_memory().await.unwrap();
        let source = MockSource::with_transcript("CEO: a transformative quarter.");

        let acquired = acquire_transcript(&db, &source, "aapl", 2024, 1)
            .await
            .unwrap();

        assert!(!acquired.already_existed);
        assert_eq!(acquired.transcript.ticker, "AAPL");

        let company = db.company_by_ticker("AAPL").await.unwrap().unwrap();
        assert_eq!(company.name, "Apple Inc.");
    }

    #[tokio::test]
    async fn test_reacquisition_returns_same_id_without_upstream_call() {
        let db = Database::in_memory().await.unwrap();
        let source = MockSource::with_transcript("CEO: a transformative quarter.");

        let first = acquire_transcript(&db, &source, "AAPL", 2024, 1)
            .await
            .unwrap();
        let second = acquire_transcript(&db, &source, "AAPL", 2024, 1)
            .await
            .unwrap();

        assert_eq!(first.transcript.id, second.transcript.id);
        assert!(second.already_existed);
        // Exactly one vendor call across both acquisitions
        assert_eq!(source.transcript_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_transcript_persists_nothing() {
        let db = Database::in_memory().await.unwrap();
        let source = MockSource::empty();

        let err = acquire_transcript(&db, &source, "AAPL", 2024, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(db.company_by_ticker("AAPL").await.unwrap().is_none());
        assert!(db.transcript_by_key("AAPL", 2024, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_upstream_error() {
        let db = Database::in_memory().await.unwrap();
        let mut source = MockSource::with_transcript("text");
        source.fail_transcript = true;

        let err = acquire_transcript(&db, &source, "AAPL", 2024, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_profile_failure_falls_back_to_ticker_name() {
        let db = Database::in_memory().await.unwrap();
        let mut source = MockSource::with_transcript("text");
        source.fail_profile = true;

        acquire_transcript(&db, &source, "MSFT", 2025, 2).await.unwrap();

        let company = db.company_by_ticker("MSFT").await.unwrap().unwrap();
        assert_eq!(company.name, "MSFT");
    }

    #[tokio::test]
    async fn test_validation_rejects_bad_input() {
        let db = Database::in_memory().await.unwrap();
        let source = MockSource::with_transcript("text");

        for (ticker, year, quarter) in [("AAPL", 2024, 0), ("AAPL", 2024, 5), ("AAPL", 1234, 1), ("  ", 2024, 1)] {
            let err = acquire_transcript(&db, &source, ticker, year, quarter)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert_eq!(source.transcript_calls.load(Ordering::SeqCst), 0);
    }
}
