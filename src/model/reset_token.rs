use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A password-reset token row. Multiple live rows per email are allowed;
/// lookups take the most recently created one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResetToken {
    pub id: u64,
    pub email: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}
