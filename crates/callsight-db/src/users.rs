//! Users and bearer-token sessions.

use anyhow::Result;
use chrono::Utc;

use crate::models::UserRow;
use crate::Database;

impl Database {
    /// Create a user. Returns `None` if the username or email is taken.
    pub async fn create_user(
        &self,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
    ) -> Result<Option<UserRow>> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(self.pool())
        .await;

        match result {
            Ok(r) => Ok(self.user_by_id(r.last_insert_rowid()).await?),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    pub async fn user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    pub async fn touch_last_login(&self, user_id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Record a session keyed by the hashed token.
    pub async fn create_session(&self, token_hash: &str, user_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO sessions (token_hash, user_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Resolve a session token hash to its user.
    pub async fn session_user(&self, token_hash: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.* FROM users u
            JOIN sessions s ON s.user_id = u.id
            WHERE s.token_hash = ?
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn delete_session(&self, token_hash: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_user_and_duplicate() {
        let db = Database::in_memory().await.unwrap();

        let user = db
            .create_user("ed", Some("ed@example.com"), "hash")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username, "ed");
        assert!(user.last_login_at.is_none());

        // Same username again
        let dup = db.create_user("ed", None, "hash2").await.unwrap();
        assert!(dup.is_none());

        // Same email, different username
        let dup = db
            .create_user("ed2", Some("ed@example.com"), "hash3")
            .await
            .unwrap();
        assert!(dup.is_none());
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let db = Database::in_memory().await.unwrap();
        let user = db.create_user("ed", None, "hash").await.unwrap().unwrap();

        db.create_session("tokenhash", user.id).await.unwrap();
        let found = db.session_user("tokenhash").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);

        assert!(db.delete_session("tokenhash").await.unwrap());
        assert!(db.session_user("tokenhash").await.unwrap().is_none());
        assert!(!db.delete_session("tokenhash").await.unwrap());
    }

    #[tokio::test]
    async fn test_touch_last_login() {
        let db = Database::in_memory().await.unwrap();
        let user = db.create_user("ed", None, "hash").await.unwrap().unwrap();

        db.touch_last_login(user.id).await.unwrap();
        let user = db.user_by_id(user.id).await.unwrap().unwrap();
        assert!(user.last_login_at.is_some());
    }
}
