use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::claims::{self, TokenType};
use crate::errors::AppError;
use crate::state::AppState;

/// The authenticated user, loaded fresh from the database per request and
/// injected as a request extension for downstream handlers.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub status: String,
    pub church_id: Option<Uuid>,
    pub groups: Vec<String>,
    pub requires_password_change: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Extracts and validates the bearer token, then resolves the user row.
/// Deleted or deactivated accounts fail even with a live token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let claims = claims::verify(&state.config.jwt_secret, token, TokenType::Access)?;

    let user: CurrentUser = sqlx::query_as(
        r#"
        SELECT id, email, name, status, church_id, groups,
               requires_password_change, created_at, updated_at
        FROM users
        WHERE id = $1 AND status <> 'inactive'
        "#,
    )
    .bind(claims.sub)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
