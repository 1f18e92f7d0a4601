use serde::{Deserialize, Serialize};

use catalog_core::UserId;

use crate::Permission;

/// A fully resolved, authenticated principal.
///
/// Built from verified token claims; carries the two role flags and the
/// permission codenames granted to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// A plain user with no flags and no permissions.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            is_staff: false,
            is_superuser: false,
            permissions: Vec::new(),
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }

    /// Superusers implicitly hold every permission.
    pub fn has_perm(&self, required: &Permission) -> bool {
        self.is_superuser
            || self
                .permissions
                .iter()
                .any(|p| p.is_wildcard() || p == required)
    }
}
