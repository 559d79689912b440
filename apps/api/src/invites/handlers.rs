use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::auth::middleware::CurrentUser;
use crate::errors::{AppError, FieldErrors};
use crate::invites::models::{CreateInviteCodeRequest, InviteCodeOut};
use crate::state::AppState;

/// POST /api/invite-codes/create
pub async fn handle_create_invite_code(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateInviteCodeRequest>,
) -> Result<(StatusCode, Json<InviteCodeOut>), AppError> {
    let mut errors = FieldErrors::new();
    if req.code.trim().is_empty() {
        errors.add("code", "This field is required.");
    }
    if req.event.trim().is_empty() {
        errors.add("event", "This field is required.");
    }
    if req.expires_at.is_none() {
        errors.add("expires_at", "This field is required.");
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM invite_codes WHERE code = $1)")
            .bind(req.code.trim())
            .fetch_one(&state.db)
            .await?;
    if taken {
        return Err(FieldErrors::field("code", "invite code with this code already exists.").into());
    }

    let invite: InviteCodeOut = sqlx::query_as(
        r#"
        INSERT INTO invite_codes (code, event, status, created_by, expires_at)
        VALUES ($1, $2, 'active', $3, $4)
        RETURNING id, code, event, used_count, status, created_by, $5::text AS created_by_name,
                  expires_at, created_at, updated_at
        "#,
    )
    .bind(req.code.trim())
    .bind(req.event.trim())
    .bind(user.id)
    .bind(req.expires_at)
    .bind(&user.name)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Created invite code {} for event {}", invite.code, invite.event);
    Ok((StatusCode::CREATED, Json(invite)))
}

/// GET /api/invite-codes
/// Bare list, newest first.
pub async fn handle_list_invite_codes(
    State(state): State<AppState>,
) -> Result<Json<Vec<InviteCodeOut>>, AppError> {
    let invites: Vec<InviteCodeOut> = sqlx::query_as(
        r#"
        SELECT ic.id, ic.code, ic.event, ic.used_count, ic.status, ic.created_by,
               u.name AS created_by_name, ic.expires_at, ic.created_at, ic.updated_at
        FROM invite_codes ic
        JOIN users u ON u.id = ic.created_by
        ORDER BY ic.created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(invites))
}
