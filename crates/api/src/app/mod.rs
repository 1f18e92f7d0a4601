//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repositories and the category directory
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: page contexts and form binding helpers
//! - `endpoints.rs`: symbolic redirect targets
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod endpoints;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let jwt = Arc::new(catalog_auth::Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services::build_services(config).await?);

    let pages = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::identify_viewer,
        ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(pages)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http())))
}
