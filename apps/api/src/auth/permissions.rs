//! Group-based authorization. Group names are plain strings stored on the
//! user row: `Admin`, `Church User`, `Candidate`, `Applicant`.

use uuid::Uuid;

use crate::auth::middleware::CurrentUser;
use crate::errors::AppError;

pub const ADMIN: &str = "Admin";
pub const CHURCH_USER: &str = "Church User";
pub const CANDIDATE: &str = "Candidate";
pub const APPLICANT: &str = "Applicant";

pub fn is_admin(user: &CurrentUser) -> bool {
    in_group(user, ADMIN)
}

pub fn is_church_user(user: &CurrentUser) -> bool {
    in_group(user, CHURCH_USER)
}

pub fn in_group(user: &CurrentUser, group: &str) -> bool {
    user.groups.iter().any(|g| g == group)
}

/// 403 unless the user belongs to at least one of the named groups.
pub fn require_any_group(user: &CurrentUser, groups: &[&str]) -> Result<(), AppError> {
    if groups.iter().any(|g| in_group(user, g)) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Admins pass unconditionally; Church Users pass only for their own church.
pub fn require_admin_or_church(user: &CurrentUser, church_id: Uuid) -> Result<(), AppError> {
    if is_admin(user) {
        return Ok(());
    }
    if is_church_user(user) && user.church_id == Some(church_id) {
        return Ok(());
    }
    Err(AppError::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with(groups: &[&str], church_id: Option<Uuid>) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "test@example.com".into(),
            name: "Test User".into(),
            status: "active".into(),
            church_id,
            groups: groups.iter().map(|g| g.to_string()).collect(),
            requires_password_change: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_any_group() {
        let user = user_with(&[CHURCH_USER], None);
        assert!(require_any_group(&user, &[ADMIN, CHURCH_USER]).is_ok());
        assert!(require_any_group(&user, &[ADMIN]).is_err());
    }

    #[test]
    fn test_no_groups_is_forbidden() {
        let user = user_with(&[], None);
        assert!(require_any_group(&user, &[ADMIN, CHURCH_USER]).is_err());
    }

    #[test]
    fn test_admin_passes_object_check_for_any_church() {
        let user = user_with(&[ADMIN], None);
        assert!(require_admin_or_church(&user, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_church_user_scoped_to_own_church() {
        let own = Uuid::new_v4();
        let user = user_with(&[CHURCH_USER], Some(own));
        assert!(require_admin_or_church(&user, own).is_ok());
        assert!(require_admin_or_church(&user, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_church_user_without_church_is_forbidden() {
        let user = user_with(&[CHURCH_USER], None);
        assert!(require_admin_or_church(&user, Uuid::new_v4()).is_err());
    }
}
