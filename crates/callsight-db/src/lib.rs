//! SQLite persistence for CallSight.
//!
//! One pool, schema applied from the workspace-root `schema.sql` on startup.
//! Store methods are grouped by entity in submodules, each an `impl Database`
//! block. Lookups return `Option`; callers decide what absence means.

pub mod companies;
pub mod models;
pub mod reports;
pub mod transcripts;
pub mod users;
pub mod watchlist;

pub use models::{
    decode_list, CompanyRow, NewReport, NewReportSide, ReportRow, TranscriptRow, UserRow,
    WatchlistRow,
};

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) and apply the schema.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            // Cascading deletes (transcripts -> reports) rely on this
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;

        Ok(db)
    }

    /// In-memory database for tests.
    pub async fn in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    async fn init_schema(&self) -> Result<()> {
        let schema = include_str!("../../../schema.sql");

        // Execute statement by statement; sqlx rejects multi-statement queries
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
