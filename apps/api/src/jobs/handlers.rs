use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::middleware::CurrentUser;
use crate::auth::permissions::{self, ADMIN, CHURCH_USER};
use crate::errors::{AppError, FieldErrors};
use crate::jobs::models::{
    CreateJobRequest, JobOut, JobWithChurch, UpdateJobRequest, JOB_STATUSES,
};
use crate::pagination::{self, Page, DEFAULT_PAGE_SIZE};
use crate::state::AppState;

const JOB_COLUMNS: &str = r#"
    j.id, j.church_id, j.title, j.ministry_type, j.employment_type,
    j.job_description, j.about_church, j.job_url_link, j.status,
    j.created_at, j.updated_at,
    c.name AS church_name, c.city AS church_city, c.state AS church_state
"#;

fn validate_status(status: &str) -> Result<(), FieldErrors> {
    if JOB_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(FieldErrors::field(
            "status",
            &format!("\"{status}\" is not a valid choice."),
        ))
    }
}

async fn fetch_job(pool: &PgPool, job_id: Uuid) -> Result<JobWithChurch, AppError> {
    let row: Option<JobWithChurch> = sqlx::query_as(&format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM jobs j
        JOIN churches c ON c.id = j.church_id
        WHERE j.id = $1
        "#
    ))
    .bind(job_id)
    .fetch_optional(pool)
    .await?;
    row.ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub status: Option<String>,
    pub church: Option<Uuid>,
    pub page: Option<u32>,
}

/// GET /api/jobs
/// Paginated; optional status and church filters.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Page<JobOut>>, AppError> {
    let page_number = pagination::page_number(query.page);
    let offset = pagination::page_offset(page_number);

    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM jobs
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::uuid IS NULL OR church_id = $2)
        "#,
    )
    .bind(&query.status)
    .bind(query.church)
    .fetch_one(&state.db)
    .await?;

    let rows: Vec<JobWithChurch> = sqlx::query_as(&format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM jobs j
        JOIN churches c ON c.id = j.church_id
        WHERE ($1::text IS NULL OR j.status = $1)
          AND ($2::uuid IS NULL OR j.church_id = $2)
        ORDER BY j.created_at DESC
        LIMIT $3 OFFSET $4
        "#
    ))
    .bind(&query.status)
    .bind(query.church)
    .bind(DEFAULT_PAGE_SIZE)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let results: Vec<JobOut> = rows.into_iter().map(JobOut::from).collect();

    let church_filter = query.church.map(|id| id.to_string());
    let mut filters: Vec<(&str, &str)> = Vec::new();
    if let Some(status) = query.status.as_deref() {
        filters.push(("status", status));
    }
    if let Some(church) = church_filter.as_deref() {
        filters.push(("church", church));
    }
    Ok(Json(Page::new(
        count,
        results,
        page_number,
        "/api/jobs",
        &filters,
    )))
}

/// POST /api/jobs
/// Admins may post for any church; Church Users only for their own.
pub async fn handle_create_job(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobOut>), AppError> {
    permissions::require_any_group(&user, &[ADMIN, CHURCH_USER])?;

    let mut errors = FieldErrors::new();
    if req.title.trim().is_empty() {
        errors.add("title", "This field is required.");
    }
    if req.ministry_type.trim().is_empty() {
        errors.add("ministry_type", "This field is required.");
    }
    if req.employment_type.trim().is_empty() {
        errors.add("employment_type", "This field is required.");
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }
    validate_status(&req.status)?;

    // Church Users fall back to their own church when none is given.
    let church_id = match req.church.or(user.church_id) {
        Some(id) => id,
        None => return Err(FieldErrors::field("church", "This field is required.").into()),
    };
    permissions::require_admin_or_church(&user, church_id)?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM churches WHERE id = $1)")
        .bind(church_id)
        .fetch_one(&state.db)
        .await?;
    if !exists {
        return Err(FieldErrors::field("church", "The specified church does not exist.").into());
    }

    let job_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO jobs
            (church_id, title, ministry_type, employment_type, job_description,
             about_church, job_url_link, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(church_id)
    .bind(req.title.trim())
    .bind(req.ministry_type.trim())
    .bind(req.employment_type.trim())
    .bind(&req.job_description)
    .bind(&req.about_church)
    .bind(req.job_url_link.trim())
    .bind(&req.status)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Created job {} for church {}", job_id, church_id);
    let job = fetch_job(&state.db, job_id).await?;
    Ok((StatusCode::CREATED, Json(JobOut::from(job))))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobOut>, AppError> {
    let job = fetch_job(&state.db, job_id).await?;
    Ok(Json(JobOut::from(job)))
}

/// PATCH /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<JobOut>, AppError> {
    let existing = fetch_job(&state.db, job_id).await?;
    permissions::require_admin_or_church(&user, existing.job.church_id)?;

    if let Some(status) = req.status.as_deref() {
        validate_status(status)?;
    }

    let job = existing.job;
    sqlx::query(
        r#"
        UPDATE jobs
        SET title = $1, ministry_type = $2, employment_type = $3, job_description = $4,
            about_church = $5, job_url_link = $6, status = $7, updated_at = NOW()
        WHERE id = $8
        "#,
    )
    .bind(req.title.unwrap_or(job.title))
    .bind(req.ministry_type.unwrap_or(job.ministry_type))
    .bind(req.employment_type.unwrap_or(job.employment_type))
    .bind(req.job_description.unwrap_or(job.job_description))
    .bind(req.about_church.unwrap_or(job.about_church))
    .bind(req.job_url_link.unwrap_or(job.job_url_link))
    .bind(req.status.unwrap_or(job.status))
    .bind(job_id)
    .execute(&state.db)
    .await?;

    let updated = fetch_job(&state.db, job_id).await?;
    Ok(Json(JobOut::from(updated)))
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let existing = fetch_job(&state.db, job_id).await?;
    permissions::require_admin_or_church(&user, existing.job.church_id)?;

    sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(job_id)
        .execute(&state.db)
        .await?;

    tracing::info!("Deleted job {}", job_id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_choices() {
        for status in JOB_STATUSES {
            assert!(validate_status(status).is_ok());
        }
        assert!(validate_status("open").is_err());
    }
}
