use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::claims::{self, TokenPair, TokenType};
use crate::auth::middleware::CurrentUser;
use crate::auth::password;
use crate::errors::{AppError, FieldErrors};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub temporary_password: String,
    pub new_password: String,
}

/// POST /api/token
/// Verifies credentials and returns an access/refresh pair.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let row: Option<(Uuid, String, String)> =
        sqlx::query_as("SELECT id, email, password_hash FROM users WHERE email = $1")
            .bind(&req.email)
            .fetch_optional(&state.db)
            .await?;

    let (id, email, password_hash) = row.ok_or(AppError::Unauthorized)?;
    if !password::verify(&req.password, &password_hash) {
        return Err(AppError::Unauthorized);
    }

    let pair = claims::issue_pair(&state.config.jwt_secret, id, &email)?;
    Ok(Json(pair))
}

/// POST /api/token/refresh
/// Exchanges a valid refresh token for a new access token.
pub async fn handle_refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<Value>, AppError> {
    let claims = claims::verify(&state.config.jwt_secret, &req.refresh, TokenType::Refresh)?;
    let access = claims::issue_access(&state.config.jwt_secret, claims.sub, &claims.email)?;
    Ok(Json(json!({ "access": access })))
}

/// POST /api/reset-password
/// Replaces a temporary password with a chosen one and clears the
/// requires_password_change flag.
pub async fn handle_reset_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let stored_hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&state.db)
        .await?;

    if !password::verify(&req.temporary_password, &stored_hash) {
        return Err(FieldErrors::detail("Temporary password is incorrect.").into());
    }
    password::validate_new_password(&req.new_password)?;

    let new_hash = password::hash(&req.new_password)?;
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $1, requires_password_change = FALSE, updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(&new_hash)
    .bind(user.id)
    .execute(&state.db)
    .await?;

    Ok(Json(json!({ "detail": "Password updated successfully." })))
}
