use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user row without the password hash; safe to serialize.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub status: String,
    pub church_id: Option<Uuid>,
    pub invite_code_id: Option<Uuid>,
    pub groups: Vec<String>,
    pub requires_password_change: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub groups: Vec<String>,
    pub church_id: Option<Uuid>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub requires_password_change: bool,
}

fn default_status() -> String {
    "pending".to_string()
}
