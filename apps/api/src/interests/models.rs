use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const SIDE_CANDIDATE: &str = "candidate";
pub const SIDE_CHURCH: &str = "church";

#[derive(Debug, Clone, FromRow)]
pub struct InterestRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub profile_id: Uuid,
    pub expressed_by: String,
    pub expressed_by_user: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Interest row with its pair's expression count folded into a flag.
#[derive(Debug, Clone, FromRow)]
pub struct InterestWithMutual {
    #[sqlx(flatten)]
    pub interest: InterestRow,
    pub is_mutual: bool,
}

/// Wire shape; `job_listing` and `profile` are the foreign keys.
#[derive(Debug, Clone, Serialize)]
pub struct InterestOut {
    pub id: Uuid,
    pub job_listing: Uuid,
    pub profile: Uuid,
    pub expressed_by: String,
    pub expressed_by_user: Option<Uuid>,
    pub is_mutual: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InterestOut {
    pub fn new(row: InterestRow, is_mutual: bool) -> Self {
        InterestOut {
            id: row.id,
            job_listing: row.job_id,
            profile: row.profile_id,
            expressed_by: row.expressed_by,
            expressed_by_user: row.expressed_by_user,
            is_mutual,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<InterestWithMutual> for InterestOut {
    fn from(row: InterestWithMutual) -> Self {
        let is_mutual = row.is_mutual;
        InterestOut::new(row.interest, is_mutual)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateInterestRequest {
    pub job_listing: Option<Uuid>,
    pub profile: Option<Uuid>,
    pub expressed_by: Option<String>,
}
