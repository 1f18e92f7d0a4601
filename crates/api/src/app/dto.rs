//! Page contexts returned by the GET endpoints and helpers for binding
//! submitted JSON to forms.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use catalog_blog::Blog;
use catalog_core::{CategoryId, FormErrors, ProductId};
use catalog_products::{
    Category, Product, ProductFormVariant, ProductGroup, ProductSubmission, Version,
    VersionFormSet, VersionFormSetErrors,
};

pub const HOME_TITLE: &str = "Каталог товаров из Южной Кореи";
pub const CONTACTS_TITLE: &str = "Контакты";
pub const BLOG_TITLE: &str = "Блог";

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub title: &'static str,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct ContactsPage {
    pub title: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ProductListPage {
    pub title: &'static str,
    pub group: ProductGroup,
    pub category_id: CategoryId,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetailPage {
    pub title: String,
    pub product: Product,
    pub versions: Vec<Version>,
    pub current_version: Option<Version>,
}

#[derive(Debug, Serialize)]
pub struct ProductEditPage {
    pub title: String,
    pub product_id: ProductId,
    pub variant: ProductFormVariant,
    pub form: ProductSubmission,
    pub versions: VersionFormSet,
}

#[derive(Debug, Serialize)]
pub struct BlogListPage {
    pub title: &'static str,
    pub posts: Vec<Blog>,
}

#[derive(Debug, Serialize)]
pub struct BlogDetailPage {
    pub title: String,
    pub post: Blog,
}

/// Unwrap a JSON body; malformed JSON is a `400`, not a form error.
pub fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, super::errors::ApiError> {
    body.map(|Json(v)| v)
        .map_err(|rejection| super::errors::ApiError::BadRequest(rejection.body_text()))
}

/// Bind a JSON object to a form type; shape mismatches become form errors.
pub fn bind_form<T: DeserializeOwned>(value: Value) -> Result<T, FormErrors> {
    Ok(serde_json::from_value(value)?)
}

/// A product edit: the parent form fields with the version rows under
/// `versions`.
#[derive(Debug)]
pub struct ProductEditSubmission {
    pub form: Result<ProductSubmission, FormErrors>,
    pub versions: Result<VersionFormSet, VersionFormSetErrors>,
}

impl ProductEditSubmission {
    pub fn bind(variant: ProductFormVariant, mut value: Value) -> Self {
        let versions = match value.as_object_mut().and_then(|o| o.remove("versions")) {
            None | Some(Value::Null) => Ok(VersionFormSet::default()),
            Some(rows) => serde_json::from_value(rows).map_err(|e| VersionFormSetErrors {
                forms: Vec::new(),
                non_form_errors: vec![format!("malformed version rows: {e}")],
            }),
        };
        Self {
            form: ProductSubmission::parse(variant, value),
            versions,
        }
    }
}
