use axum::{Router, routing::{get, post}};

pub mod blog;
pub mod catalog;
pub mod categories;
pub mod products;
pub mod system;

/// Router for every page and form endpoint.
///
/// Anonymous viewers reach the read-only pages; mutations check the viewer
/// inside the handlers.
pub fn router() -> Router {
    Router::new()
        .route("/", get(catalog::home))
        .route("/contacts", get(catalog::contacts))
        .route("/categories", post(categories::create_category))
        .nest("/products", products::router())
        .nest("/blog", blog::router())
}
