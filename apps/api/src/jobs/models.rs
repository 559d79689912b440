use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::churches::models::ChurchSummary;

pub const JOB_STATUSES: &[&str] = &["draft", "pending", "approved", "rejected"];

#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub church_id: Uuid,
    pub title: String,
    pub ministry_type: String,
    pub employment_type: String,
    pub job_description: String,
    pub about_church: String,
    pub job_url_link: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Job row with its church columns joined in, as queried for responses.
#[derive(Debug, Clone, FromRow)]
pub struct JobWithChurch {
    #[sqlx(flatten)]
    pub job: JobRow,
    pub church_name: String,
    pub church_city: String,
    pub church_state: String,
}

/// Wire shape: the owning church embeds as a summary object.
#[derive(Debug, Clone, Serialize)]
pub struct JobOut {
    pub id: Uuid,
    pub church: ChurchSummary,
    pub title: String,
    pub ministry_type: String,
    pub employment_type: String,
    pub job_description: String,
    pub about_church: String,
    pub job_url_link: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobWithChurch> for JobOut {
    fn from(row: JobWithChurch) -> Self {
        JobOut {
            id: row.job.id,
            church: ChurchSummary {
                id: row.job.church_id,
                name: row.church_name,
                city: row.church_city,
                state: row.church_state,
            },
            title: row.job.title,
            ministry_type: row.job.ministry_type,
            employment_type: row.job.employment_type,
            job_description: row.job.job_description,
            about_church: row.job.about_church,
            job_url_link: row.job.job_url_link,
            status: row.job.status,
            created_at: row.job.created_at,
            updated_at: row.job.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub church: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ministry_type: String,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub about_church: String,
    #[serde(default)]
    pub job_url_link: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "draft".to_string()
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub ministry_type: Option<String>,
    pub employment_type: Option<String>,
    pub job_description: Option<String>,
    pub about_church: Option<String>,
    pub job_url_link: Option<String>,
    pub status: Option<String>,
}
