use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

const ACCESS_LIFETIME_MINUTES: i64 = 60;
const REFRESH_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub token_type: TokenType,
    pub exp: usize,
}

/// The `{access, refresh}` pair returned on login.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub fn issue_pair(secret: &str, user_id: Uuid, email: &str) -> anyhow::Result<TokenPair> {
    Ok(TokenPair {
        access: issue_access(secret, user_id, email)?,
        refresh: issue(
            secret,
            user_id,
            email,
            TokenType::Refresh,
            Duration::days(REFRESH_LIFETIME_DAYS),
        )?,
    })
}

pub fn issue_access(secret: &str, user_id: Uuid, email: &str) -> anyhow::Result<String> {
    issue(
        secret,
        user_id,
        email,
        TokenType::Access,
        Duration::minutes(ACCESS_LIFETIME_MINUTES),
    )
}

fn issue(
    secret: &str,
    user_id: Uuid,
    email: &str,
    token_type: TokenType,
    lifetime: Duration,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        token_type,
        exp: (Utc::now() + lifetime).timestamp() as usize,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Decodes a token and checks it is of the expected kind. Expired or
/// malformed tokens map to 401.
pub fn verify(secret: &str, token: &str, expected: TokenType) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    if data.claims.token_type != expected {
        return Err(AppError::Unauthorized);
    }
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_access_token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_access(SECRET, user_id, "user@example.com").unwrap();
        let claims = verify(SECRET, &token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let pair = issue_pair(SECRET, Uuid::new_v4(), "user@example.com").unwrap();
        assert!(verify(SECRET, &pair.refresh, TokenType::Access).is_err());
        assert!(verify(SECRET, &pair.refresh, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let pair = issue_pair(SECRET, Uuid::new_v4(), "user@example.com").unwrap();
        assert!(verify(SECRET, &pair.access, TokenType::Refresh).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_access(SECRET, Uuid::new_v4(), "user@example.com").unwrap();
        assert!(verify("other-secret", &token, TokenType::Access).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify(SECRET, "not.a.token", TokenType::Access).is_err());
    }
}
