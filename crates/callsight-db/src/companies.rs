//! Companies, created implicitly on first transcript acquisition.

use anyhow::Result;
use chrono::Utc;

use crate::models::CompanyRow;
use crate::Database;

impl Database {
    /// Insert the company if absent; an existing row is left untouched.
    pub async fn ensure_company(
        &self,
        ticker: &str,
        name: &str,
        logo_url: Option<&str>,
    ) -> Result<CompanyRow> {
        sqlx::query(
            r#"
            INSERT INTO companies (ticker, name, logo_url, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(ticker) DO NOTHING
            "#,
        )
        .bind(ticker)
        .bind(name)
        .bind(logo_url)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;

        let row = sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE ticker = ?")
            .bind(ticker)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    pub async fn company_by_ticker(&self, ticker: &str) -> Result<Option<CompanyRow>> {
        let row = sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE ticker = ?")
            .bind(ticker)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    /// List companies, optionally filtered by a name/ticker substring.
    pub async fn list_companies(&self, search: Option<&str>) -> Result<Vec<CompanyRow>> {
        let rows = match search {
            Some(q) => {
                let pattern = format!("%{}%", q);
                sqlx::query_as::<_, CompanyRow>(
                    r#"
                    SELECT * FROM companies
                    WHERE name LIKE ? OR ticker LIKE ?
                    ORDER BY ticker
                    "#,
                )
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies ORDER BY ticker")
                    .fetch_all(self.pool())
                    .await?
            }
        };
        Ok(rows)
    }
}
