use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::middleware::CurrentUser;
use crate::auth::permissions::{self, ADMIN, APPLICANT, CANDIDATE, CHURCH_USER};
use crate::errors::{AppError, FieldErrors};
use crate::interests::matching;
use crate::interests::models::{
    CreateInterestRequest, InterestOut, InterestRow, InterestWithMutual, SIDE_CANDIDATE,
    SIDE_CHURCH,
};
use crate::state::AppState;

/// Which side the caller expresses, and the ownership rule that goes with it.
fn resolve_side(user: &CurrentUser, requested: Option<&str>) -> Result<String, AppError> {
    if permissions::is_admin(user) {
        return match requested {
            Some(side @ (SIDE_CANDIDATE | SIDE_CHURCH)) => Ok(side.to_string()),
            _ => Err(FieldErrors::field("expressed_by", "\"candidate\" or \"church\" is required.")
                .into()),
        };
    }
    if permissions::is_church_user(user) {
        return Ok(SIDE_CHURCH.to_string());
    }
    if permissions::in_group(user, CANDIDATE) || permissions::in_group(user, APPLICANT) {
        return Ok(SIDE_CANDIDATE.to_string());
    }
    Err(AppError::Forbidden)
}

/// POST /api/mutual-interests
pub async fn handle_create_interest(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateInterestRequest>,
) -> Result<(StatusCode, Json<InterestOut>), AppError> {
    let side = resolve_side(&user, req.expressed_by.as_deref())?;

    let job_id = req
        .job_listing
        .ok_or_else(|| FieldErrors::field("job_listing", "This field is required."))?;
    let job_church: Option<Uuid> = sqlx::query_scalar("SELECT church_id FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(&state.db)
        .await?;
    let job_church = job_church
        .ok_or_else(|| FieldErrors::field("job_listing", "The specified job does not exist."))?;

    // Candidates default to their own profile; church users and admins name one.
    let profile_id = match req.profile {
        Some(id) => id,
        None if side == SIDE_CANDIDATE => {
            sqlx::query_scalar("SELECT id FROM profiles WHERE user_id = $1")
                .bind(user.id)
                .fetch_optional(&state.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?
        }
        None => return Err(FieldErrors::field("profile", "This field is required.").into()),
    };
    let profile_owner: Option<Uuid> =
        sqlx::query_scalar("SELECT user_id FROM profiles WHERE id = $1")
            .bind(profile_id)
            .fetch_optional(&state.db)
            .await?;
    let profile_owner = profile_owner
        .ok_or_else(|| FieldErrors::field("profile", "The specified profile does not exist."))?;

    // Ownership: church side only over own jobs, candidate side only over own profile.
    if !permissions::is_admin(&user) {
        match side.as_str() {
            SIDE_CHURCH => permissions::require_admin_or_church(&user, job_church)?,
            _ => {
                if profile_owner != user.id {
                    return Err(AppError::Forbidden);
                }
            }
        }
    }

    let duplicate: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM mutual_interests
            WHERE job_id = $1 AND profile_id = $2 AND expressed_by = $3
        )
        "#,
    )
    .bind(job_id)
    .bind(profile_id)
    .bind(&side)
    .fetch_one(&state.db)
    .await?;
    if duplicate {
        return Err(FieldErrors::non_field(
            "Interest has already been expressed for this job and profile.",
        )
        .into());
    }

    let row: InterestRow = sqlx::query_as(
        r#"
        INSERT INTO mutual_interests (job_id, profile_id, expressed_by, expressed_by_user)
        VALUES ($1, $2, $3, $4)
        RETURNING id, job_id, profile_id, expressed_by, expressed_by_user,
                  created_at, updated_at
        "#,
    )
    .bind(job_id)
    .bind(profile_id)
    .bind(&side)
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    let is_mutual = matching::is_pair_mutual(&state.db, job_id, profile_id).await?;
    tracing::info!(
        "Interest expressed by {} for job {} / profile {} (mutual: {})",
        side,
        job_id,
        profile_id,
        is_mutual
    );
    Ok((StatusCode::CREATED, Json(InterestOut::new(row, is_mutual))))
}

/// GET /api/mutual-interests
/// Scoped listing: Admins see everything, Church Users their church's jobs,
/// candidates their own profile.
pub async fn handle_list_interests(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<InterestOut>>, AppError> {
    let base = r#"
        SELECT mi.id, mi.job_id, mi.profile_id, mi.expressed_by, mi.expressed_by_user,
               mi.created_at, mi.updated_at, (cnt.n = 2) AS is_mutual
        FROM mutual_interests mi
        JOIN (
            SELECT job_id, profile_id, COUNT(*) AS n
            FROM mutual_interests
            GROUP BY job_id, profile_id
        ) cnt ON cnt.job_id = mi.job_id AND cnt.profile_id = mi.profile_id
    "#;

    let rows: Vec<InterestWithMutual> = if permissions::is_admin(&user) {
        sqlx::query_as(&format!("{base} ORDER BY mi.created_at DESC"))
            .fetch_all(&state.db)
            .await?
    } else if permissions::is_church_user(&user) {
        let church_id = user.church_id.ok_or(AppError::Forbidden)?;
        sqlx::query_as(&format!(
            r#"
            {base}
            JOIN jobs j ON j.id = mi.job_id
            WHERE j.church_id = $1
            ORDER BY mi.created_at DESC
            "#
        ))
        .bind(church_id)
        .fetch_all(&state.db)
        .await?
    } else {
        sqlx::query_as(&format!(
            r#"
            {base}
            JOIN profiles p ON p.id = mi.profile_id
            WHERE p.user_id = $1
            ORDER BY mi.created_at DESC
            "#
        ))
        .bind(user.id)
        .fetch_all(&state.db)
        .await?
    };

    Ok(Json(rows.into_iter().map(InterestOut::from).collect()))
}

/// DELETE /api/mutual-interests/:id
/// Retract an expression; only the side that made it (or an Admin) may.
pub async fn handle_delete_interest(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(interest_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let row: Option<InterestRow> = sqlx::query_as(
        r#"
        SELECT id, job_id, profile_id, expressed_by, expressed_by_user,
               created_at, updated_at
        FROM mutual_interests
        WHERE id = $1
        "#,
    )
    .bind(interest_id)
    .fetch_optional(&state.db)
    .await?;
    let row = row.ok_or_else(|| AppError::NotFound(format!("Interest {interest_id} not found")))?;

    if !permissions::is_admin(&user) {
        match row.expressed_by.as_str() {
            SIDE_CHURCH => {
                let job_church: Uuid =
                    sqlx::query_scalar("SELECT church_id FROM jobs WHERE id = $1")
                        .bind(row.job_id)
                        .fetch_one(&state.db)
                        .await?;
                permissions::require_admin_or_church(&user, job_church)?;
            }
            _ => {
                let owner: Uuid = sqlx::query_scalar("SELECT user_id FROM profiles WHERE id = $1")
                    .bind(row.profile_id)
                    .fetch_one(&state.db)
                    .await?;
                if owner != user.id {
                    return Err(AppError::Forbidden);
                }
            }
        }
    }

    sqlx::query("DELETE FROM mutual_interests WHERE id = $1")
        .bind(interest_id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct MatchesQuery {
    pub job_listing: Option<Uuid>,
}

/// GET /api/mutual-interests/matches
/// Mutual matches over the caller's church's jobs, optionally narrowed to
/// one job. A job id outside the church's set is a 404, not an empty list.
pub async fn handle_matches(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<MatchesQuery>,
) -> Result<Json<Vec<InterestOut>>, AppError> {
    let church_id = user.church_id.ok_or(AppError::Forbidden)?;

    let mut job_ids = matching::church_job_ids(&state.db, church_id).await?;
    if let Some(filter) = query.job_listing {
        if !job_ids.contains(&filter) {
            return Err(AppError::NotFound(format!("Job {filter} not found")));
        }
        job_ids = vec![filter];
    }

    let rows = matching::matches_for_jobs(&state.db, &job_ids).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| InterestOut::new(row, true))
            .collect(),
    ))
}

/// GET /api/mutual-interests/admin-matches
/// Admin-only unscoped variant.
pub async fn handle_admin_matches(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<MatchesQuery>,
) -> Result<Json<Vec<InterestOut>>, AppError> {
    permissions::require_any_group(&user, &[ADMIN])?;

    if let Some(filter) = query.job_listing {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM jobs WHERE id = $1)")
            .bind(filter)
            .fetch_one(&state.db)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Job {filter} not found")));
        }
    }

    let rows = matching::matches_all(&state.db, query.job_listing).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| InterestOut::new(row, true))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with(groups: &[&str], church_id: Option<Uuid>) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "test@example.com".into(),
            name: "Test User".into(),
            status: "active".into(),
            church_id,
            groups: groups.iter().map(|g| g.to_string()).collect(),
            requires_password_change: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_church_user_always_expresses_church_side() {
        let user = user_with(&[CHURCH_USER], Some(Uuid::new_v4()));
        assert_eq!(resolve_side(&user, None).unwrap(), SIDE_CHURCH);
        // an explicit request does not override the group
        assert_eq!(resolve_side(&user, Some("candidate")).unwrap(), SIDE_CHURCH);
    }

    #[test]
    fn test_candidate_and_applicant_express_candidate_side() {
        for group in [CANDIDATE, APPLICANT] {
            let user = user_with(&[group], None);
            assert_eq!(resolve_side(&user, None).unwrap(), SIDE_CANDIDATE);
        }
    }

    #[test]
    fn test_admin_must_name_a_side() {
        let user = user_with(&[ADMIN], None);
        assert!(resolve_side(&user, None).is_err());
        assert!(resolve_side(&user, Some("someone")).is_err());
        assert_eq!(resolve_side(&user, Some("church")).unwrap(), SIDE_CHURCH);
        assert_eq!(
            resolve_side(&user, Some("candidate")).unwrap(),
            SIDE_CANDIDATE
        );
    }

    #[test]
    fn test_ungrouped_user_is_forbidden() {
        let user = user_with(&[], None);
        assert!(matches!(
            resolve_side(&user, Some("church")),
            Err(AppError::Forbidden)
        ));
    }
}
