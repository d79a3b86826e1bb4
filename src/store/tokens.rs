use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use crate::model::reset_token::ResetToken;

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(
        &self,
        email: &str,
        token: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error>;

    /// Most recently created row for `email`, optionally narrowed to an exact
    /// token value.
    async fn find_latest(
        &self,
        email: &str,
        token: Option<&str>,
    ) -> Result<Option<ResetToken>, sqlx::Error>;

    /// Removes by exact `(email, token)`. Returns `false` when nothing
    /// matched.
    async fn delete(&self, email: &str, token: &str) -> Result<bool, sqlx::Error>;
}

pub struct MySqlTokenStore {
    pool: MySqlPool,
}

impl MySqlTokenStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for MySqlTokenStore {
    async fn insert(
        &self,
        email: &str,
        token: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO password_resets (email, token, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(email)
        .bind(token)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_latest(
        &self,
        email: &str,
        token: Option<&str>,
    ) -> Result<Option<ResetToken>, sqlx::Error> {
        match token {
            Some(token) => {
                sqlx::query_as::<_, ResetToken>(
                    r#"
                    SELECT id, email, token, created_at
                    FROM password_resets
                    WHERE email = ? AND token = ?
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                    "#,
                )
                .bind(email)
                .bind(token)
                .fetch_optional(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ResetToken>(
                    r#"
                    SELECT id, email, token, created_at
                    FROM password_resets
                    WHERE email = ?
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                    "#,
                )
                .bind(email)
                .fetch_optional(&self.pool)
                .await
            }
        }
    }

    async fn delete(&self, email: &str, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM password_resets
            WHERE email = ? AND token = ?
            "#,
        )
        .bind(email)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
