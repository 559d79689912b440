use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::FieldErrors;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hashes a password with Argon2id and a fresh salt.
pub fn hash(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hashed.to_string())
}

/// Constant-time verification against a stored hash.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Minimum-length policy applied to new passwords.
pub fn validate_new_password(password: &str) -> Result<(), FieldErrors> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(FieldErrors::non_field(
            "This password is too short. It must contain at least 8 characters.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hashed = hash("securepassword").unwrap();
        assert!(verify("securepassword", &hashed));
        assert!(!verify("wrongpassword", &hashed));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash("securepassword").unwrap();
        let second = hash("securepassword").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(validate_new_password("short").is_err());
        assert!(validate_new_password("longenough").is_ok());
    }
}
