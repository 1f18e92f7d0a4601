//! Product edit authorization at the controller boundary.
//!
//! Runs before any repository write; the grant it returns also selects the
//! form variant, so there is no authorized-but-formless state.

use catalog_products::{EditGrant, Product, resolve_edit_grant};

use crate::app::errors::ApiError;
use crate::context::Viewer;

/// Resolve the edit grant for `viewer` on `product`.
///
/// Anonymous viewers get `401`; authenticated viewers without a grant get `403`.
pub fn authorize_product_edit(viewer: &Viewer, product: &Product) -> Result<EditGrant, ApiError> {
    let principal = viewer.require_authenticated()?;
    Ok(resolve_edit_grant(principal, product)?)
}

#[cfg(test)]
mod tests {
    use catalog_auth::{Permission, Principal};
    use catalog_core::{CategoryId, ProductId, UserId};
    use catalog_products::{NewProduct, ProductFormVariant};
    use chrono::Utc;

    use super::*;

    fn product_owned_by(owner: UserId) -> Product {
        NewProduct {
            title: "Toner".into(),
            description: String::new(),
            preview: None,
            category_id: CategoryId::new(5),
            price: None,
            owner,
            created_at: Utc::now(),
        }
        .into_product(ProductId::new(1))
    }

    #[test]
    fn owner_gets_full_form() {
        let owner = UserId::new();
        let viewer = Viewer::Authenticated(Principal::user(owner));
        let grant = authorize_product_edit(&viewer, &product_owned_by(owner)).unwrap();
        assert_eq!(grant.form_variant(), ProductFormVariant::Full);
    }

    #[test]
    fn moderator_gets_restricted_form() {
        let viewer = Viewer::Authenticated(
            Principal::user(UserId::new()).with_permission(Permission::CHANGE_PRODUCT),
        );
        let grant = authorize_product_edit(&viewer, &product_owned_by(UserId::new())).unwrap();
        assert_eq!(grant, EditGrant::Moderator);
    }

    #[test]
    fn stranger_and_anonymous_are_rejected() {
        let product = product_owned_by(UserId::new());
        let stranger = Viewer::Authenticated(Principal::user(UserId::new()));
        assert!(matches!(
            authorize_product_edit(&stranger, &product),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            authorize_product_edit(&Viewer::Anonymous, &product),
            Err(ApiError::Unauthenticated)
        ));
    }
}
