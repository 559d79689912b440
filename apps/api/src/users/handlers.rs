use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::auth::middleware::CurrentUser;
use crate::auth::password;
use crate::errors::{AppError, FieldErrors};
use crate::state::AppState;
use crate::users::models::{CreateUserRequest, UserRow};
use crate::validation::is_valid_email;

/// POST /api/users/create
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserRow>), AppError> {
    let mut errors = FieldErrors::new();
    if req.email.trim().is_empty() {
        errors.add("email", "This field is required.");
    } else if !is_valid_email(req.email.trim()) {
        errors.add("email", "Enter a valid email address.");
    }
    if req.name.trim().is_empty() {
        errors.add("name", "This field is required.");
    }
    if req.password.is_empty() {
        errors.add("password", "This field is required.");
    }
    if !matches!(req.status.as_str(), "active" | "inactive" | "pending") {
        errors.add("status", format!("\"{}\" is not a valid choice.", req.status).as_str());
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    if let Some(church_id) = req.church_id {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM churches WHERE id = $1)")
            .bind(church_id)
            .fetch_one(&state.db)
            .await?;
        if !exists {
            return Err(FieldErrors::field("church_id", "The specified church does not exist.").into());
        }
    }

    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(req.email.trim())
        .fetch_one(&state.db)
        .await?;
    if taken {
        return Err(FieldErrors::field("email", "user with this email already exists.").into());
    }

    let password_hash = password::hash(&req.password)?;
    let user: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users
            (email, name, password_hash, status, church_id, groups, requires_password_change)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, email, name, status, church_id, invite_code_id, groups,
                  requires_password_change, created_at, updated_at
        "#,
    )
    .bind(req.email.trim())
    .bind(req.name.trim())
    .bind(&password_hash)
    .bind(&req.status)
    .bind(req.church_id)
    .bind(&req.groups)
    .bind(req.requires_password_change)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Created user {} ({})", user.email, user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/user/me
/// The authenticated user, groups included.
pub async fn handle_user_me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserRow>, AppError> {
    let row: Option<UserRow> = sqlx::query_as(
        r#"
        SELECT id, email, name, status, church_id, invite_code_id, groups,
               requires_password_change, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?;

    let row = row.ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;
    Ok(Json(row))
}
