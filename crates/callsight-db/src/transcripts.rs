//! Transcript rows, unique per (ticker, fiscal year, fiscal quarter).

use anyhow::{anyhow, Result};
use chrono::Utc;

use crate::models::TranscriptRow;
use crate::Database;

impl Database {
    pub async fn transcript_by_id(&self, id: i64) -> Result<Option<TranscriptRow>> {
        let row = sqlx::query_as::<_, TranscriptRow>("SELECT * FROM transcripts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    pub async fn transcript_by_key(
        &self,
        ticker: &str,
        fiscal_year: i64,
        fiscal_quarter: i64,
    ) -> Result<Option<TranscriptRow>> {
        let row = sqlx::query_as::<_, TranscriptRow>(
            r#"
            SELECT * FROM transcripts
            WHERE ticker = ? AND fiscal_year = ? AND fiscal_quarter = ?
            "#,
        )
        .bind(ticker)
        .bind(fiscal_year)
        .bind(fiscal_quarter)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn transcripts_for_company(&self, ticker: &str) -> Result<Vec<TranscriptRow>> {
        let rows = sqlx::query_as::<_, TranscriptRow>(
            r#"
            SELECT * FROM transcripts
            WHERE ticker = ?
            ORDER BY fiscal_year DESC, fiscal_quarter DESC
            "#,
        )
        .bind(ticker)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    /// Insert a transcript. A concurrent duplicate insert loses the race on
    /// the UNIQUE constraint and resolves to the existing row; the bool is
    /// true when that happened.
    pub async fn insert_transcript(
        &self,
        ticker: &str,
        fiscal_year: i64,
        fiscal_quarter: i64,
        call_date: Option<&str>,
        raw_text: &str,
        source: &str,
    ) -> Result<(TranscriptRow, bool)> {
        let result = sqlx::query(
            r#"
            INSERT INTO transcripts (ticker, fiscal_year, fiscal_quarter, call_date, raw_text, source, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(ticker)
        .bind(fiscal_year)
        .bind(fiscal_quarter)
        .bind(call_date)
        .bind(raw_text)
        .bind(source)
        .bind(Utc::now())
        .execute(self.pool())
        .await;

        match result {
            Ok(r) => {
                let row = self
                    .transcript_by_id(r.last_insert_rowid())
                    .await?
                    .ok_or_else(|| anyhow!("inserted transcript row missing"))?;
                Ok((row, false))
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tracing::debug!(
                    %ticker,
                    fiscal_year,
                    fiscal_quarter,
                    "lost transcript insert race, resolving to existing row"
                );
                let row = self
                    .transcript_by_key(ticker, fiscal_year, fiscal_quarter)
                    .await?
                    .ok_or_else(|| anyhow!("transcript unique violation without existing row"))?;
                Ok((row, true))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete_transcript(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transcripts WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
