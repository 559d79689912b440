use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChurchRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact church embedded in job listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChurchSummary {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateChurchRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub street_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default = "default_status")]
    pub status: String,
    /// Staff accounts created together with the church, all-or-nothing.
    #[serde(default)]
    pub users: Vec<NestedUserRequest>,
}

fn default_status() -> String {
    "active".to_string()
}

#[derive(Debug, Deserialize)]
pub struct NestedUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub requires_password_change: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateChurchResponse {
    #[serde(flatten)]
    pub church: ChurchRow,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<NestedUserResponse>,
}

#[derive(Debug, Serialize)]
pub struct NestedUserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub status: String,
    pub requires_password_change: bool,
}
