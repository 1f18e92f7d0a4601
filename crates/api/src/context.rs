use catalog_auth::{Permission, Principal};

use crate::app::errors::ApiError;

/// Who is making the request.
///
/// Attached to every request by the identification middleware; anonymous
/// viewers may read public pages but cannot mutate anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Authenticated(Principal),
}

impl Viewer {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(p) => Some(p),
        }
    }

    /// The authenticated principal, or `401`.
    pub fn require_authenticated(&self) -> Result<&Principal, ApiError> {
        self.principal().ok_or(ApiError::Unauthenticated)
    }

    /// `401` for anonymous viewers, `403` when the permission is missing.
    pub fn require_permission(&self, permission: &Permission) -> Result<&Principal, ApiError> {
        let principal = self.require_authenticated()?;
        catalog_auth::authorize(principal, permission)?;
        Ok(principal)
    }

    /// Staff and superusers only.
    pub fn require_staff(&self) -> Result<&Principal, ApiError> {
        let principal = self.require_authenticated()?;
        if principal.is_staff || principal.is_superuser {
            Ok(principal)
        } else {
            tracing::warn!(user_id = %principal.user_id, "staff-only action denied");
            Err(ApiError::Forbidden("staff only".to_string()))
        }
    }
}
