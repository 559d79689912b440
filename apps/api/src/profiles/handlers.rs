use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::middleware::CurrentUser;
use crate::auth::permissions::{self, ADMIN, CHURCH_USER};
use crate::errors::{AppError, FieldErrors};
use crate::pagination::{self, Page, DEFAULT_PAGE_SIZE};
use crate::profiles::models::{ProfileOut, ProfileWithInvite, PROFILE_STATUSES};
use crate::profiles::storage;
use crate::state::AppState;

const PROFILE_COLUMNS: &str = r#"
    p.id, p.user_id, p.invite_code_id, p.street_address, p.city, p.state, p.zipcode,
    p.phone, p.status, p.resume_key, p.profile_image_key, p.video_url,
    p.placement_preferences, p.submitted_at, p.created_at, p.updated_at,
    ic.code AS invite_code_string
"#;

async fn fetch_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<ProfileWithInvite>, AppError> {
    Ok(sqlx::query_as(&format!(
        r#"
        SELECT {PROFILE_COLUMNS}
        FROM profiles p
        LEFT JOIN invite_codes ic ON ic.id = p.invite_code_id
        WHERE p.user_id = $1
        "#
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}

fn to_out(state: &AppState, row: ProfileWithInvite) -> ProfileOut {
    ProfileOut::from_row(
        row.profile,
        row.invite_code_string,
        &state.config.s3_endpoint,
        &state.config.s3_bucket,
    )
}

/// GET /api/profile/me
pub async fn handle_profile_me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ProfileOut>, AppError> {
    let row = fetch_by_user(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(to_out(&state, row)))
}

/// One uploaded file from the multipart form.
struct UploadedFile {
    file_name: String,
    content_type: String,
    data: Bytes,
}

#[derive(Default)]
struct ProfileForm {
    street_address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zipcode: Option<String>,
    phone: Option<String>,
    status: Option<String>,
    video_url: Option<String>,
    placement_preferences: Option<String>,
    resume: Option<UploadedFile>,
    profile_image: Option<UploadedFile>,
}

async fn read_form(mut multipart: Multipart) -> Result<ProfileForm, AppError> {
    let mut form = ProfileForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FieldErrors::detail(&format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "resume" | "profile_image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| FieldErrors::field(&name, &format!("Upload failed: {e}")))?;
                let file = UploadedFile {
                    file_name,
                    content_type,
                    data,
                };
                if name == "resume" {
                    form.resume = Some(file);
                } else {
                    form.profile_image = Some(file);
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| FieldErrors::field(&name, &format!("Invalid field: {e}")))?;
                match name.as_str() {
                    "street_address" => form.street_address = Some(value),
                    "city" => form.city = Some(value),
                    "state" => form.state = Some(value),
                    "zipcode" => form.zipcode = Some(value),
                    "phone" => form.phone = Some(value),
                    "status" => form.status = Some(value),
                    "video_url" => form.video_url = Some(value),
                    "placement_preferences" => form.placement_preferences = Some(value),
                    _ => {} // unknown fields are ignored
                }
            }
        }
    }
    Ok(form)
}

/// `placement_preferences` arrives as a JSON-encoded array string.
fn parse_placement_preferences(raw: &str) -> Result<Value, FieldErrors> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) if value.is_array() => Ok(value),
        _ => Err(FieldErrors::field(
            "placement_preferences",
            "Expected a JSON list of placement preferences.",
        )),
    }
}

fn validate_status(status: &str) -> Result<(), FieldErrors> {
    if PROFILE_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(FieldErrors::field(
            "status",
            &format!("\"{status}\" is not a valid choice."),
        ))
    }
}

/// PUT|PATCH /api/profile/me
/// Field-wise update over the multipart form; uploads replace the stored S3
/// objects. Moving to `pending` stamps `submitted_at`.
pub async fn handle_update_profile_me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<ProfileOut>, AppError> {
    let existing = fetch_by_user(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    let profile = existing.profile;

    let form = read_form(multipart).await?;

    let placement_preferences = match form.placement_preferences.as_deref() {
        Some(raw) => parse_placement_preferences(raw)?,
        None => profile.placement_preferences.clone(),
    };
    if let Some(status) = form.status.as_deref() {
        validate_status(status)?;
    }

    // Uploads happen before the row update; a failed upload leaves the old
    // keys in place.
    let mut resume_key = profile.resume_key.clone();
    if let Some(file) = form.resume {
        let key = storage::object_key(storage::RESUME_PREFIX, &file.file_name);
        storage::upload(
            &state.s3,
            &state.config.s3_bucket,
            &key,
            file.data,
            &file.content_type,
        )
        .await?;
        if let Some(old) = resume_key.replace(key) {
            storage::delete(&state.s3, &state.config.s3_bucket, &old).await?;
        }
    }
    let mut profile_image_key = profile.profile_image_key.clone();
    if let Some(file) = form.profile_image {
        let key = storage::object_key(storage::PROFILE_IMAGE_PREFIX, &file.file_name);
        storage::upload(
            &state.s3,
            &state.config.s3_bucket,
            &key,
            file.data,
            &file.content_type,
        )
        .await?;
        if let Some(old) = profile_image_key.replace(key) {
            storage::delete(&state.s3, &state.config.s3_bucket, &old).await?;
        }
    }

    let new_status = form.status.unwrap_or_else(|| profile.status.clone());
    let submitted_at = if new_status == "pending" && profile.status != "pending" {
        Some(Utc::now())
    } else {
        profile.submitted_at
    };

    sqlx::query(
        r#"
        UPDATE profiles
        SET street_address = $1, city = $2, state = $3, zipcode = $4, phone = $5,
            status = $6, resume_key = $7, profile_image_key = $8, video_url = $9,
            placement_preferences = $10, submitted_at = $11, updated_at = NOW()
        WHERE id = $12
        "#,
    )
    .bind(form.street_address.unwrap_or(profile.street_address))
    .bind(form.city.unwrap_or(profile.city))
    .bind(form.state.unwrap_or(profile.state))
    .bind(form.zipcode.unwrap_or(profile.zipcode))
    .bind(form.phone.or(profile.phone))
    .bind(&new_status)
    .bind(&resume_key)
    .bind(&profile_image_key)
    .bind(form.video_url.or(profile.video_url))
    .bind(&placement_preferences)
    .bind(submitted_at)
    .bind(profile.id)
    .execute(&state.db)
    .await?;

    let row = fetch_by_user(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(to_out(&state, row)))
}

/// POST /api/profile/reset
/// Deletes the profile and its stored files, then recreates a bare draft
/// preserving the user and invite-code links.
pub async fn handle_reset_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let existing = fetch_by_user(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    let old = existing.profile;

    if let Some(key) = &old.resume_key {
        storage::delete(&state.s3, &state.config.s3_bucket, key).await?;
    }
    if let Some(key) = &old.profile_image_key {
        storage::delete(&state.s3, &state.config.s3_bucket, key).await?;
    }

    let mut tx = state.db.begin().await?;
    sqlx::query("DELETE FROM profiles WHERE id = $1")
        .bind(old.id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        r#"
        INSERT INTO profiles (user_id, invite_code_id, status)
        VALUES ($1, $2, 'draft')
        "#,
    )
    .bind(old.user_id)
    .bind(old.invite_code_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!("Reset profile for user {}", user.id);

    let fresh = fetch_by_user(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "detail": "Profile reset to draft successfully.",
            "profile": to_out(&state, fresh),
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ProfileListQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
}

/// GET /api/profiles
/// Admin and Church User only; paginated, optional status filter.
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ProfileListQuery>,
) -> Result<Json<Page<ProfileOut>>, AppError> {
    permissions::require_any_group(&user, &[ADMIN, CHURCH_USER])?;

    let page_number = pagination::page_number(query.page);
    let offset = pagination::page_offset(page_number);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM profiles WHERE ($1::text IS NULL OR status = $1)",
    )
    .bind(&query.status)
    .fetch_one(&state.db)
    .await?;

    let rows: Vec<ProfileWithInvite> = sqlx::query_as(&format!(
        r#"
        SELECT {PROFILE_COLUMNS}
        FROM profiles p
        LEFT JOIN invite_codes ic ON ic.id = p.invite_code_id
        WHERE ($1::text IS NULL OR p.status = $1)
        ORDER BY p.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(&query.status)
    .bind(DEFAULT_PAGE_SIZE)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let results = rows.into_iter().map(|row| to_out(&state, row)).collect();
    let mut filters: Vec<(&str, &str)> = Vec::new();
    if let Some(status) = query.status.as_deref() {
        filters.push(("status", status));
    }
    Ok(Json(Page::new(
        count,
        results,
        page_number,
        "/api/profiles",
        &filters,
    )))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub status: String,
}

/// PATCH /api/profiles/:id/review
/// Admin-only status transition; no other field changes.
pub async fn handle_review_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ProfileOut>, AppError> {
    permissions::require_any_group(&user, &[ADMIN])?;
    validate_status(&req.status)?;

    let updated = sqlx::query("UPDATE profiles SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(&req.status)
        .bind(profile_id)
        .execute(&state.db)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Profile {profile_id} not found")));
    }

    let row: ProfileWithInvite = sqlx::query_as(&format!(
        r#"
        SELECT {PROFILE_COLUMNS}
        FROM profiles p
        LEFT JOIN invite_codes ic ON ic.id = p.invite_code_id
        WHERE p.id = $1
        "#
    ))
    .bind(profile_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(to_out(&state, row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_preferences_must_be_array() {
        assert!(parse_placement_preferences(r#"["Music Ministry"]"#).is_ok());
        assert!(parse_placement_preferences(r#"[]"#).is_ok());
        assert!(parse_placement_preferences(r#"{"a": 1}"#).is_err());
        assert!(parse_placement_preferences("not json").is_err());
    }

    #[test]
    fn test_status_choices() {
        for status in PROFILE_STATUSES {
            assert!(validate_status(status).is_ok());
        }
        assert!(validate_status("not_a_valid_status").is_err());
        assert!(validate_status("").is_err());
    }
}
