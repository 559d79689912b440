//! Mutual-match resolution.
//!
//! All interest rows for the candidate job set are grouped by
//! (job, profile); the per-side uniqueness constraint means a pair with
//! exactly two rows holds one candidate and one church expression. The
//! church-side row of each qualifying pair is returned as the canonical
//! match record.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interests::models::{InterestRow, SIDE_CHURCH};

/// Matches across a church's own jobs.
pub async fn matches_for_jobs(
    pool: &PgPool,
    job_ids: &[Uuid],
) -> Result<Vec<InterestRow>, AppError> {
    Ok(sqlx::query_as(
        r#"
        SELECT mi.id, mi.job_id, mi.profile_id, mi.expressed_by, mi.expressed_by_user,
               mi.created_at, mi.updated_at
        FROM mutual_interests mi
        JOIN (
            SELECT job_id, profile_id
            FROM mutual_interests
            WHERE job_id = ANY($1)
            GROUP BY job_id, profile_id
            HAVING COUNT(*) = 2
        ) pairs ON pairs.job_id = mi.job_id AND pairs.profile_id = mi.profile_id
        WHERE mi.expressed_by = $2
        ORDER BY mi.created_at DESC
        "#,
    )
    .bind(job_ids)
    .bind(SIDE_CHURCH)
    .fetch_all(pool)
    .await?)
}

/// Unscoped variant for administrators, optionally narrowed to one job.
pub async fn matches_all(
    pool: &PgPool,
    job_filter: Option<Uuid>,
) -> Result<Vec<InterestRow>, AppError> {
    Ok(sqlx::query_as(
        r#"
        SELECT mi.id, mi.job_id, mi.profile_id, mi.expressed_by, mi.expressed_by_user,
               mi.created_at, mi.updated_at
        FROM mutual_interests mi
        JOIN (
            SELECT job_id, profile_id
            FROM mutual_interests
            WHERE ($1::uuid IS NULL OR job_id = $1)
            GROUP BY job_id, profile_id
            HAVING COUNT(*) = 2
        ) pairs ON pairs.job_id = mi.job_id AND pairs.profile_id = mi.profile_id
        WHERE mi.expressed_by = $2
        ORDER BY mi.created_at DESC
        "#,
    )
    .bind(job_filter)
    .bind(SIDE_CHURCH)
    .fetch_all(pool)
    .await?)
}

/// True once both sides have expressed interest in the pair.
pub async fn is_pair_mutual(
    pool: &PgPool,
    job_id: Uuid,
    profile_id: Uuid,
) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM mutual_interests WHERE job_id = $1 AND profile_id = $2",
    )
    .bind(job_id)
    .bind(profile_id)
    .fetch_one(pool)
    .await?;
    Ok(count == 2)
}

/// All job ids belonging to a church.
pub async fn church_job_ids(pool: &PgPool, church_id: Uuid) -> Result<Vec<Uuid>, AppError> {
    Ok(
        sqlx::query_scalar("SELECT id FROM jobs WHERE church_id = $1")
            .bind(church_id)
            .fetch_all(pool)
            .await?,
    )
}
