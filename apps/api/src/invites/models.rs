use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Invite code joined with its creator's display name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InviteCodeOut {
    pub id: Uuid,
    pub code: String,
    pub event: String,
    pub used_count: i32,
    pub status: String,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInviteCodeRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub event: String,
    pub expires_at: Option<DateTime<Utc>>,
}
