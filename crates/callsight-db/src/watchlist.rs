//! Per-user ticker watchlists.

use anyhow::Result;
use chrono::Utc;

use crate::models::WatchlistRow;
use crate::Database;

impl Database {
    /// Add a ticker; duplicates are ignored. Returns true when a row was added.
    pub async fn add_watchlist_item(&self, user_id: i64, ticker: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO watchlist_items (user_id, ticker, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(ticker)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn watchlist_for_user(&self, user_id: i64) -> Result<Vec<WatchlistRow>> {
        let rows = sqlx::query_as::<_, WatchlistRow>(
            r#"
            SELECT * FROM watchlist_items
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    pub async fn remove_watchlist_item(&self, user_id: i64, ticker: &str) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM watchlist_items WHERE user_id = ? AND ticker = ?")
                .bind(user_id)
                .bind(ticker)
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
