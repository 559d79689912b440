use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Field-keyed validation errors, serialized as `{"field": ["message", ...]}`
/// the way the REST clients expect them. Nested shapes (the per-user error
/// array on church creation) are inserted with [`FieldErrors::insert_raw`].
#[derive(Debug, Default, Clone)]
pub struct FieldErrors(Map<String, Value>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single error for a single field.
    pub fn field(name: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(name, message);
        errors
    }

    /// Object-level error under the `non_field_errors` key.
    pub fn non_field(message: &str) -> Self {
        Self::field("non_field_errors", message)
    }

    /// Top-level `detail` message.
    pub fn detail(message: &str) -> Self {
        let mut errors = Self::new();
        errors.0.insert("detail".into(), Value::String(message.into()));
        errors
    }

    /// Appends a message to a field's error list.
    pub fn add(&mut self, name: &str, message: &str) {
        let entry = self
            .0
            .entry(name.to_string())
            .or_insert_with(|| Value::Array(vec![]));
        if let Value::Array(list) = entry {
            list.push(Value::String(message.to_string()));
        }
    }

    /// Inserts a pre-built value (e.g. a nested array of per-row error maps).
    pub fn insert_raw(&mut self, name: &str, value: Value) {
        self.0.insert(name.to_string(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "{}", keys.join(", "))
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Validation errors keep their field-keyed body; everything else uses
        // the {error: {code, message}} envelope.
        let (status, code, message) = match self {
            AppError::Validation(errors) => {
                return (StatusCode::BAD_REQUEST, Json(errors.into_value())).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::S3(msg) => {
                tracing::error!("S3 error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "S3_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_accumulate() {
        let mut errors = FieldErrors::new();
        errors.add("email", "This field is required.");
        errors.add("email", "Enter a valid email address.");
        errors.add("password", "This field is required.");
        let value = errors.into_value();
        assert_eq!(value["email"].as_array().unwrap().len(), 2);
        assert_eq!(value["password"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_non_field_errors_key() {
        let value =
            FieldErrors::non_field("A church with this name, city, and state already exists.")
                .into_value();
        assert!(value["non_field_errors"][0]
            .as_str()
            .unwrap()
            .contains("already exists"));
    }

    #[test]
    fn test_detail_is_plain_string() {
        let value = FieldErrors::detail("Temporary password is incorrect.").into_value();
        assert_eq!(value["detail"], "Temporary password is incorrect.");
    }

    #[test]
    fn test_insert_raw_nested() {
        let mut errors = FieldErrors::new();
        errors.insert_raw(
            "users",
            serde_json::json!([{}, {"email": ["This field is required."]}]),
        );
        let value = errors.into_value();
        assert!(value["users"][0].as_object().unwrap().is_empty());
        assert_eq!(value["users"][1]["email"][0], "This field is required.");
    }
}
