use thiserror::Error;

use crate::{Permission, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    MissingPermission(String),

    #[error("forbidden: {0}")]
    Denied(String),
}

/// Authorize a principal for a single permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.has_perm(required) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %principal.user_id,
            permission = %required,
            "permission check failed"
        );
        Err(AuthzError::MissingPermission(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::UserId;

    #[test]
    fn authorize_reports_missing_codename() {
        let p = Principal::user(UserId::new());
        assert_eq!(
            authorize(&p, &Permission::ADD_BLOG),
            Err(AuthzError::MissingPermission("catalog.add_blog".to_string()))
        );
    }

    #[test]
    fn authorize_passes_granted_permission() {
        let p = Principal::user(UserId::new()).with_permission(Permission::ADD_BLOG);
        assert!(authorize(&p, &Permission::ADD_BLOG).is_ok());
    }
}
