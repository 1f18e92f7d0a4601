//! Symbolic names for the routes a controller can redirect to.

use axum::response::{IntoResponse, Redirect, Response};

use catalog_core::{BlogId, ProductId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Home,
    ProductDetail(ProductId),
    BlogList,
    BlogDetail(BlogId),
}

impl Endpoint {
    pub fn path(self) -> String {
        match self {
            Endpoint::Home => "/".to_string(),
            Endpoint::ProductDetail(id) => format!("/products/{id}"),
            Endpoint::BlogList => "/blog".to_string(),
            Endpoint::BlogDetail(id) => format!("/blog/{id}"),
        }
    }
}

/// `303 See Other` to `endpoint`.
pub fn redirect(endpoint: Endpoint) -> Response {
    Redirect::to(&endpoint.path()).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};

    use super::*;

    #[test]
    fn paths_render_ids() {
        assert_eq!(Endpoint::ProductDetail(ProductId::new(4)).path(), "/products/4");
        assert_eq!(Endpoint::BlogDetail(BlogId::new(9)).path(), "/blog/9");
        assert_eq!(Endpoint::BlogList.path(), "/blog");
        assert_eq!(Endpoint::Home.path(), "/");
    }

    #[test]
    fn redirect_is_see_other() {
        let res = redirect(Endpoint::BlogList);
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/blog");
    }
}
