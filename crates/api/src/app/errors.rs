use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use catalog_auth::AuthzError;
use catalog_core::{DomainError, FormErrors};
use catalog_infra::StoreError;
use catalog_products::VersionFormSetErrors;

/// Everything a controller can fail with, mapped onto one JSON error shape:
/// `{"error": code, "message": ..., "fields"?: ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("submitted form is invalid")]
    InvalidForm(FormErrors),

    #[error("submitted product edit is invalid")]
    InvalidEdit {
        form: FormErrors,
        formset: VersionFormSetErrors,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn not_found(entity: &'static str, id: impl core::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        Self::Forbidden(err.to_string())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidId(msg) => Self::InvalidId(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthenticated => unauthenticated("authentication required"),
            ApiError::InvalidToken(msg) => unauthenticated(msg),
            ApiError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
            e @ ApiError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", e.to_string()),
            ApiError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
            ApiError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::InvalidForm(errors) => validation_error(json!(errors)),
            ApiError::InvalidEdit { form, formset } => validation_error(json!({
                "form": form,
                "formset": formset,
            })),
            ApiError::Store(err) => store_error_to_response(err),
        }
    }
}

fn store_error_to_response(err: StoreError) -> Response {
    match err {
        e @ StoreError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", e.to_string()),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::InvalidReference(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_reference", msg)
        }
        other => {
            tracing::error!(error = %other, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage failure")
        }
    }
}

fn unauthenticated(message: impl Into<String>) -> Response {
    let mut res = json_error(StatusCode::UNAUTHORIZED, "unauthenticated", message);
    res.headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    res
}

fn validation_error(fields: serde_json::Value) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        axum::Json(json!({
            "error": "validation_error",
            "message": "submitted data is invalid",
            "fields": fields,
        })),
    )
        .into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
