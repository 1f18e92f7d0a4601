//! Read-only pages: home, contacts and the three product group listings.

use std::sync::Arc;

use axum::{Json, extract::Extension};

use catalog_products::ProductGroup;

use crate::app::dto::{self, ContactsPage, HomePage, ProductListPage};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn home(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<HomePage>, ApiError> {
    let categories = services.categories.list().await?;
    Ok(Json(HomePage {
        title: dto::HOME_TITLE,
        categories,
    }))
}

pub async fn contacts() -> Json<ContactsPage> {
    Json(ContactsPage {
        title: dto::CONTACTS_TITLE,
    })
}

pub async fn skin_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<ProductListPage>, ApiError> {
    group_listing(&services, ProductGroup::Skin).await
}

pub async fn hygiene_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<ProductListPage>, ApiError> {
    group_listing(&services, ProductGroup::Hygiene).await
}

pub async fn home_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<ProductListPage>, ApiError> {
    group_listing(&services, ProductGroup::Home).await
}

async fn group_listing(
    services: &AppServices,
    group: ProductGroup,
) -> Result<Json<ProductListPage>, ApiError> {
    let category_id = services.groups.category_for(group);
    let products = services.products.list_by_category(category_id).await?;
    Ok(Json(ProductListPage {
        title: group.page_title(),
        group,
        category_id,
        products,
    }))
}
