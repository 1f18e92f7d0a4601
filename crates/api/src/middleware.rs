use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use catalog_auth::JwtValidator;

use crate::app::errors::ApiError;
use crate::context::Viewer;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Attach a [`Viewer`] to every request.
///
/// No `Authorization` header means an anonymous viewer; a header that is
/// present but not a valid bearer token is rejected with `401`.
pub async fn identify_viewer(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let viewer = match extract_bearer(req.headers()) {
        Ok(None) => Viewer::Anonymous,
        Ok(Some(token)) => match state.jwt.validate(token, Utc::now()) {
            Ok(claims) => Viewer::Authenticated(claims.into_principal()),
            Err(e) => {
                tracing::debug!(error = %e, "rejected bearer token");
                return ApiError::InvalidToken(e.to_string()).into_response();
            }
        },
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(viewer);
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header
        .to_str()
        .map_err(|_| ApiError::InvalidToken("authorization header is not ASCII".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::InvalidToken("expected a Bearer token".into()))?
        .trim();

    if token.is_empty() {
        return Err(ApiError::InvalidToken("empty bearer token".into()));
    }

    Ok(Some(token))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn absent_header_is_anonymous() {
        assert!(matches!(extract_bearer(&HeaderMap::new()), Ok(None)));
    }

    #[test]
    fn bearer_token_is_extracted() {
        let h = headers("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&h).unwrap(), Some("abc.def.ghi"));
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_rejected() {
        assert!(extract_bearer(&headers("Basic dXNlcjpwdw==")).is_err());
        assert!(extract_bearer(&headers("Bearer   ")).is_err());
    }
}
