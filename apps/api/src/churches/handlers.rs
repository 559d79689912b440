use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::auth::password;
use crate::churches::models::{
    ChurchRow, CreateChurchRequest, CreateChurchResponse, NestedUserRequest, NestedUserResponse,
};
use crate::errors::{AppError, FieldErrors};
use crate::state::AppState;
use crate::validation::{
    is_valid_email, is_valid_phone, is_valid_state, is_valid_zipcode, title_case,
};

/// POST /api/churches/create
/// Creates a church and, optionally, its staff users in one transaction.
/// Any invalid nested user rolls back the church and every other user.
pub async fn handle_create_church(
    State(state): State<AppState>,
    Json(req): Json<CreateChurchRequest>,
) -> Result<(StatusCode, Json<CreateChurchResponse>), AppError> {
    validate_church_fields(&req)?;
    check_unique(&state.db, &req).await?;

    let mut tx = state.db.begin().await?;

    let church: ChurchRow = sqlx::query_as(
        r#"
        INSERT INTO churches
            (name, email, phone, website, street_address, city, state, zipcode, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(title_case(&req.name))
    .bind(req.email.trim())
    .bind(req.phone.trim())
    .bind(req.website.trim())
    .bind(req.street_address.trim())
    .bind(title_case(&req.city))
    .bind(req.state.trim().to_uppercase())
    .bind(req.zipcode.trim())
    .bind(&req.status)
    .fetch_one(&mut *tx)
    .await?;

    let users = create_nested_users(&mut tx, church.id, &req.users).await?;

    tx.commit().await?;
    tracing::info!("Created church {} ({})", church.name, church.id);

    Ok((
        StatusCode::CREATED,
        Json(CreateChurchResponse { church, users }),
    ))
}

fn validate_church_fields(req: &CreateChurchRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if req.name.trim().is_empty() {
        errors.add("name", "This field is required.");
    }
    if req.city.trim().is_empty() {
        errors.add("city", "This field is required.");
    }
    if !is_valid_email(req.email.trim()) {
        errors.add("email", "Enter a valid email address.");
    }
    if !is_valid_state(req.state.trim()) {
        errors.add("state", format!("\"{}\" is not a valid choice.", req.state).as_str());
    }
    if !is_valid_phone(req.phone.trim()) {
        errors.add("phone", "Enter a valid phone number.");
    }
    if !is_valid_zipcode(req.zipcode.trim()) {
        errors.add("zipcode", "Enter a valid US ZIP code.");
    }
    if !matches!(req.status.as_str(), "active" | "inactive") {
        errors.add("status", format!("\"{}\" is not a valid choice.", req.status).as_str());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

/// (name, city) compare case-insensitively; state is already a fixed code.
async fn check_unique(pool: &PgPool, req: &CreateChurchRequest) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM churches
            WHERE lower(name) = lower($1)
              AND lower(city) = lower($2)
              AND state = $3
        )
        "#,
    )
    .bind(req.name.trim())
    .bind(req.city.trim())
    .bind(req.state.trim().to_uppercase())
    .fetch_one(pool)
    .await?;

    if exists {
        return Err(FieldErrors::non_field(
            "A church with this name, city, and state already exists.",
        )
        .into());
    }
    Ok(())
}

/// Validates every nested user before touching the database so the error
/// response covers the whole batch, then inserts them. Returning an error
/// from inside the open transaction rolls the church back with them.
async fn create_nested_users(
    tx: &mut PgConnection,
    church_id: Uuid,
    users: &[NestedUserRequest],
) -> Result<Vec<NestedUserResponse>, AppError> {
    if users.is_empty() {
        return Ok(vec![]);
    }

    let mut per_user_errors: Vec<Value> = Vec::with_capacity(users.len());
    let mut seen_emails = std::collections::HashSet::new();
    let mut any_invalid = false;
    for user in users {
        let mut errors = FieldErrors::new();
        if user.email.trim().is_empty() {
            errors.add("email", "This field is required.");
        } else if !is_valid_email(user.email.trim()) {
            errors.add("email", "Enter a valid email address.");
        } else if !seen_emails.insert(user.email.trim().to_lowercase()) {
            errors.add("email", "user with this email already exists.");
        } else {
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                    .bind(user.email.trim())
                    .fetch_one(&mut *tx)
                    .await?;
            if taken {
                errors.add("email", "user with this email already exists.");
            }
        }
        if user.password.is_empty() {
            errors.add("password", "This field is required.");
        }
        if !matches!(user.status.as_str(), "active" | "inactive" | "pending") {
            errors.add("status", format!("\"{}\" is not a valid choice.", user.status).as_str());
        }
        if !errors.is_empty() {
            any_invalid = true;
        }
        per_user_errors.push(errors.into_value());
    }

    if any_invalid {
        let mut errors = FieldErrors::new();
        errors.insert_raw("users", Value::Array(per_user_errors));
        return Err(errors.into());
    }

    let mut created = Vec::with_capacity(users.len());
    for user in users {
        let name = format!("{} {}", user.first_name.trim(), user.last_name.trim());
        let password_hash = password::hash(&user.password)?;
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users
                (email, name, password_hash, status, church_id, groups, requires_password_change)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user.email.trim())
        .bind(&name)
        .bind(&password_hash)
        .bind(&user.status)
        .bind(church_id)
        .bind(&user.groups)
        .bind(user.requires_password_change)
        .fetch_one(&mut *tx)
        .await?;

        created.push(NestedUserResponse {
            id,
            email: user.email.trim().to_string(),
            name,
            status: user.status.clone(),
            requires_password_change: user.requires_password_change,
        });
    }
    Ok(created)
}
