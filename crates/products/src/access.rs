//! Product edit access policy.
//!
//! Authorization and form selection are the same decision: a caller either
//! gets an [`EditGrant`] (which always maps to exactly one form variant) or an
//! [`AuthzError`].

use serde::Serialize;

use catalog_auth::{AuthzError, Permission, Principal};

use crate::Product;

/// Why a principal may edit a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditGrant {
    Owner,
    Staff,
    Superuser,
    /// Holds `catalog.change_product` without owning the product.
    Moderator,
}

/// Field set presented to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFormVariant {
    Full,
    Moderator,
}

impl EditGrant {
    pub fn form_variant(self) -> ProductFormVariant {
        match self {
            EditGrant::Owner | EditGrant::Staff | EditGrant::Superuser => ProductFormVariant::Full,
            EditGrant::Moderator => ProductFormVariant::Moderator,
        }
    }
}

/// Decide whether `principal` may edit `product`, and how.
///
/// Checked in order: ownership, staff flag, superuser flag, change permission.
pub fn resolve_edit_grant(principal: &Principal, product: &Product) -> Result<EditGrant, AuthzError> {
    if product.is_owned_by(principal.user_id) {
        return Ok(EditGrant::Owner);
    }
    if principal.is_staff {
        return Ok(EditGrant::Staff);
    }
    if principal.is_superuser {
        return Ok(EditGrant::Superuser);
    }
    if principal.has_perm(&Permission::CHANGE_PRODUCT) {
        return Ok(EditGrant::Moderator);
    }

    tracing::warn!(
        user_id = %principal.user_id,
        product_id = %product.id,
        "product edit denied"
    );
    Err(AuthzError::Denied(format!(
        "not allowed to edit product {}",
        product.id
    )))
}
