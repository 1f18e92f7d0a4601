use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    response::Response,
};
use serde_json::Value;

use catalog_products::CategoryForm;

use crate::app::dto;
use crate::app::endpoints::{Endpoint, redirect};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::Viewer;

/// Staff-only; the cached category list is invalidated by the directory.
pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<Viewer>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let principal = viewer.require_staff()?;
    let form: CategoryForm = dto::bind_form(dto::json_body(body)?).map_err(ApiError::InvalidForm)?;
    let new = form.clean().map_err(ApiError::InvalidForm)?;

    let category = services.categories.create(new).await?;
    tracing::info!(category_id = %category.id, created_by = %principal.user_id, "category created");
    Ok(redirect(Endpoint::Home))
}
