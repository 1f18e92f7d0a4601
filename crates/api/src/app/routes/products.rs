//! Product create, detail, edit page and update.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    response::Response,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::Value;

use catalog_core::ProductId;
use catalog_products::{Product, ProductForm, ProductSubmission, VersionFormSet, current_version};

use crate::app::dto::{self, ProductDetailPage, ProductEditPage, ProductEditSubmission};
use crate::app::endpoints::{Endpoint, redirect};
use crate::app::errors::ApiError;
use crate::app::routes::catalog;
use crate::app::services::AppServices;
use crate::authz::authorize_product_edit;
use crate::context::Viewer;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product))
        .route("/skin", get(catalog::skin_products))
        .route("/hygiene", get(catalog::hygiene_products))
        .route("/home", get(catalog::home_products))
        .route("/:id", get(product_detail))
        .route("/:id/edit", get(edit_page).post(update_product))
}

fn parse_product_id(raw: &str) -> Result<ProductId, ApiError> {
    Ok(raw.parse::<ProductId>()?)
}

async fn load_product(services: &AppServices, id: ProductId) -> Result<Product, ApiError> {
    services
        .products
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("product", id))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<Viewer>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let principal = viewer.require_authenticated()?;
    let form: ProductForm = dto::bind_form(dto::json_body(body)?).map_err(ApiError::InvalidForm)?;

    let category_exists = services.category_exists().await?;
    form.clean(category_exists).map_err(ApiError::InvalidForm)?;

    let product = services
        .products
        .insert(form.into_new_product(principal.user_id, Utc::now()))
        .await?;

    tracing::info!(product_id = %product.id, owner = %principal.user_id, "product created");
    Ok(redirect(Endpoint::ProductDetail(product.id)))
}

pub async fn product_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetailPage>, ApiError> {
    let id = parse_product_id(&id)?;
    let product = load_product(&services, id).await?;
    let versions = services.versions.list_for_product(id).await?;
    let current = current_version(&versions).cloned();

    Ok(Json(ProductDetailPage {
        title: product.title.clone(),
        product,
        versions,
        current_version: current,
    }))
}

pub async fn edit_page(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> Result<Json<ProductEditPage>, ApiError> {
    viewer.require_authenticated()?;
    let id = parse_product_id(&id)?;
    let product = load_product(&services, id).await?;
    let variant = authorize_product_edit(&viewer, &product)?.form_variant();
    let versions = services.versions.list_for_product(id).await?;

    Ok(Json(ProductEditPage {
        title: product.title.clone(),
        product_id: id,
        variant,
        form: ProductSubmission::initial(variant, &product),
        versions: VersionFormSet::initial(&versions),
    }))
}

/// Persist nothing unless both the product form and the version form-set
/// validate; then save the product first and the version changes after it.
pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let principal = viewer.require_authenticated()?;
    let id = parse_product_id(&id)?;
    let mut product = load_product(&services, id).await?;
    let grant = authorize_product_edit(&viewer, &product)?;

    let submitted = ProductEditSubmission::bind(grant.form_variant(), dto::json_body(body)?);
    let existing = services.versions.list_for_product(id).await?;
    let category_exists = services.category_exists().await?;

    let form = submitted
        .form
        .and_then(|form| form.clean(category_exists).map(|()| form));
    let changes = submitted
        .versions
        .and_then(|set| set.clean(id, &existing));

    let (form, changes) = match (form, changes) {
        (Ok(form), Ok(changes)) => (form, changes),
        (form, changes) => {
            return Err(ApiError::InvalidEdit {
                form: form.err().unwrap_or_default(),
                formset: changes.err().unwrap_or_default(),
            });
        }
    };

    form.apply_to(&mut product, Utc::now());
    services.products.update(&product).await?;
    if !changes.is_empty() {
        services.versions.apply_changes(id, changes).await?;
    }

    tracing::info!(
        product_id = %id,
        editor = %principal.user_id,
        grant = ?grant,
        "product updated"
    );
    Ok(redirect(Endpoint::ProductDetail(id)))
}
