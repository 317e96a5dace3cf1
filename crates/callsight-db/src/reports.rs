//! Analysis reports: insert-once, owner-scoped reads, cascade-deleted with
//! their transcript.

use anyhow::{anyhow, Result};
use chrono::Utc;

use crate::models::{NewReport, ReportRow};
use crate::Database;

impl Database {
    pub async fn insert_report(&self, report: &NewReport) -> Result<ReportRow> {
        let result = sqlx::query(
            r#"
            INSERT INTO analysis_reports (
                user_id, transcript_id,
                gemini_summary, gemini_sentiment, gemini_confidence_score,
                gemini_evasiveness_score, gemini_key_topics, gemini_red_flags,
                gemini_model, gemini_error, gemini_raw_response,
                chatgpt_summary, chatgpt_sentiment, chatgpt_confidence_score,
                chatgpt_evasiveness_score, chatgpt_key_topics, chatgpt_red_flags,
                chatgpt_model, chatgpt_error, chatgpt_raw_response,
                comparison_notes, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(report.user_id)
        .bind(report.transcript_id)
        .bind(&report.gemini.summary)
        .bind(&report.gemini.sentiment)
        .bind(report.gemini.confidence_score)
        .bind(report.gemini.evasiveness_score)
        .bind(&report.gemini.key_topics)
        .bind(&report.gemini.red_flags)
        .bind(&report.gemini.model)
        .bind(&report.gemini.error)
        .bind(&report.gemini.raw_response)
        .bind(&report.chatgpt.summary)
        .bind(&report.chatgpt.sentiment)
        .bind(report.chatgpt.confidence_score)
        .bind(report.chatgpt.evasiveness_score)
        .bind(&report.chatgpt.key_topics)
        .bind(&report.chatgpt.red_flags)
        .bind(&report.chatgpt.model)
        .bind(&report.chatgpt.error)
        .bind(&report.chatgpt.raw_response)
        .bind(&report.comparison_notes)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;

        self.report_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow!("inserted report row missing"))
    }

    pub async fn report_by_id(&self, id: i64) -> Result<Option<ReportRow>> {
        let row = sqlx::query_as::<_, ReportRow>("SELECT * FROM analysis_reports WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    /// Owner-scoped lookup: someone else's report is as good as absent.
    pub async fn report_for_user(&self, id: i64, user_id: i64) -> Result<Option<ReportRow>> {
        let row = sqlx::query_as::<_, ReportRow>(
            "SELECT * FROM analysis_reports WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn reports_for_user(&self, user_id: i64) -> Result<Vec<ReportRow>> {
        let rows = sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT * FROM analysis_reports
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    pub async fn count_reports_for_transcript(&self, transcript_id: i64) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM analysis_reports WHERE transcript_id = ?")
                .bind(transcript_id)
                .fetch_one(self.pool())
                .await?;
        Ok(count)
    }

    pub async fn delete_report_for_user(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM analysis_reports WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
