use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::profiles::storage;

pub const PROFILE_STATUSES: &[&str] = &["draft", "pending", "approved", "rejected"];

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub invite_code_id: Option<Uuid>,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub phone: Option<String>,
    pub status: String,
    pub resume_key: Option<String>,
    pub profile_image_key: Option<String>,
    pub video_url: Option<String>,
    pub placement_preferences: Value,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape of a profile. File fields serialize as public URLs; `user` and
/// `invite_code` are the bare foreign keys the frontend expects.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileOut {
    pub id: Uuid,
    pub user: Uuid,
    pub invite_code: Option<Uuid>,
    pub invite_code_string: Option<String>,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub phone: Option<String>,
    pub status: String,
    pub resume: Option<String>,
    pub profile_image: Option<String>,
    pub video_url: Option<String>,
    pub placement_preferences: Value,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileOut {
    pub fn from_row(
        row: ProfileRow,
        invite_code_string: Option<String>,
        s3_endpoint: &str,
        s3_bucket: &str,
    ) -> Self {
        ProfileOut {
            id: row.id,
            user: row.user_id,
            invite_code: row.invite_code_id,
            invite_code_string,
            street_address: row.street_address,
            city: row.city,
            state: row.state,
            zipcode: row.zipcode,
            phone: row.phone,
            status: row.status,
            resume: row
                .resume_key
                .as_deref()
                .map(|key| storage::public_url(s3_endpoint, s3_bucket, key)),
            profile_image: row
                .profile_image_key
                .as_deref()
                .map(|key| storage::public_url(s3_endpoint, s3_bucket, key)),
            video_url: row.video_url,
            placement_preferences: row.placement_preferences,
            submitted_at: row.submitted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Profile row joined with its invite code string, for list queries.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileWithInvite {
    #[sqlx(flatten)]
    pub profile: ProfileRow,
    pub invite_code_string: Option<String>,
}
