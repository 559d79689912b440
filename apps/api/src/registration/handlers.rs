//! Invite-gated self-registration for candidates and applicants.
//! Creates the user, a draft profile, and bumps the invite counter in one
//! transaction.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::password;
use crate::auth::permissions::{APPLICANT, CANDIDATE};
use crate::errors::{AppError, FieldErrors};
use crate::state::AppState;
use crate::validation::is_valid_email;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub invite_code: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// POST /api/candidates/register
pub async fn handle_register_candidate(
    state: State<AppState>,
    req: Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    register(state, req, CANDIDATE).await
}

/// POST /api/applicants/register
pub async fn handle_register_applicant(
    state: State<AppState>,
    req: Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    register(state, req, APPLICANT).await
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
    group: &str,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut errors = FieldErrors::new();
    if req.invite_code.trim().is_empty() {
        errors.add("invite_code", "This field is required.");
    }
    if req.email.trim().is_empty() {
        errors.add("email", "This field is required.");
    } else if !is_valid_email(req.email.trim()) {
        errors.add("email", "Enter a valid email address.");
    }
    if req.password.is_empty() {
        errors.add("password", "This field is required.");
    }
    if req.first_name.trim().is_empty() {
        errors.add("first_name", "This field is required.");
    }
    if req.last_name.trim().is_empty() {
        errors.add("last_name", "This field is required.");
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    // The invite must exist, be active, and be unexpired.
    let invite: Option<(Uuid, String, DateTime<Utc>)> =
        sqlx::query_as("SELECT id, status, expires_at FROM invite_codes WHERE code = $1")
            .bind(req.invite_code.trim())
            .fetch_optional(&state.db)
            .await?;
    let invite_id = match invite {
        Some((id, status, expires_at)) if status == "active" && expires_at > Utc::now() => id,
        _ => {
            return Err(FieldErrors::field("invite_code", "Invalid or expired invite code.").into())
        }
    };

    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(req.email.trim())
        .fetch_one(&state.db)
        .await?;
    if taken {
        return Err(FieldErrors::field("email", "user with this email already exists.").into());
    }

    let name = format!("{} {}", req.first_name.trim(), req.last_name.trim());
    let password_hash = password::hash(&req.password)?;

    let mut tx = state.db.begin().await?;

    let user_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, name, password_hash, status, groups, invite_code_id)
        VALUES ($1, $2, $3, 'active', $4, $5)
        RETURNING id
        "#,
    )
    .bind(req.email.trim())
    .bind(&name)
    .bind(&password_hash)
    .bind(vec![group.to_string()])
    .bind(invite_id)
    .fetch_one(&mut *tx)
    .await?;

    let profile_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO profiles (user_id, invite_code_id, status)
        VALUES ($1, $2, 'draft')
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(invite_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE invite_codes SET used_count = used_count + 1, updated_at = NOW() WHERE id = $1",
    )
    .bind(invite_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!("Registered {} {} ({})", group, name, user_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user_id,
            "email": req.email.trim(),
            "name": name,
            "first_name": req.first_name.trim(),
            "last_name": req.last_name.trim(),
            "groups": [group],
            "profile_id": profile_id,
        })),
    ))
}
