//! Blog list, detail (by id or slug) and the permission-gated mutations.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    response::Response,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::Value;

use catalog_auth::Permission;
use catalog_blog::{Blog, BlogForm};
use catalog_core::BlogId;

use crate::app::dto::{self, BlogDetailPage, BlogListPage};
use crate::app::endpoints::{Endpoint, redirect};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::Viewer;

pub fn router() -> Router {
    Router::new()
        .route("/", get(blog_list).post(create_blog))
        .route("/:id", get(blog_detail))
        .route("/slug/:slug", get(blog_detail_by_slug))
        .route("/:id/edit", post(update_blog))
        .route("/:id/delete", post(delete_blog))
}

fn parse_blog_id(raw: &str) -> Result<BlogId, ApiError> {
    Ok(raw.parse::<BlogId>()?)
}

fn bind_blog_form(body: Result<Json<Value>, JsonRejection>) -> Result<BlogForm, ApiError> {
    let form: BlogForm = dto::bind_form(dto::json_body(body)?).map_err(ApiError::InvalidForm)?;
    form.clean().map_err(ApiError::InvalidForm)?;
    Ok(form)
}

pub async fn blog_list(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<BlogListPage>, ApiError> {
    let posts = services.blogs.list_published().await?;
    Ok(Json(BlogListPage {
        title: dto::BLOG_TITLE,
        posts,
    }))
}

/// Count the view and render the incremented record.
///
/// Read-then-write: concurrent views of one post may lose increments.
async fn show_post(services: &AppServices, mut post: Blog) -> Result<Json<BlogDetailPage>, ApiError> {
    post.register_view();
    services.blogs.update(&post).await?;
    Ok(Json(BlogDetailPage {
        title: post.title.clone(),
        post,
    }))
}

pub async fn blog_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<BlogDetailPage>, ApiError> {
    let id = parse_blog_id(&id)?;
    let post = services
        .blogs
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("blog", id))?;
    show_post(&services, post).await
}

pub async fn blog_detail_by_slug(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> Result<Json<BlogDetailPage>, ApiError> {
    let post = services
        .blogs
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("blog", &slug))?;
    show_post(&services, post).await
}

pub async fn create_blog(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<Viewer>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let principal = viewer.require_permission(&Permission::ADD_BLOG)?;
    let form = bind_blog_form(body)?;

    let post = services.blogs.insert(form.into_new_blog(Utc::now())).await?;
    tracing::info!(blog_id = %post.id, slug = %post.slug, author = %principal.user_id, "blog post created");
    Ok(redirect(Endpoint::BlogList))
}

pub async fn update_blog(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let principal = viewer.require_permission(&Permission::CHANGE_BLOG)?;
    let id = parse_blog_id(&id)?;
    let mut post = services
        .blogs
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("blog", id))?;
    let form = bind_blog_form(body)?;

    form.apply_to(&mut post);
    services.blogs.update(&post).await?;
    tracing::info!(blog_id = %id, slug = %post.slug, editor = %principal.user_id, "blog post updated");
    Ok(redirect(Endpoint::BlogDetail(id)))
}

pub async fn delete_blog(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let principal = viewer.require_permission(&Permission::DELETE_BLOG)?;
    let id = parse_blog_id(&id)?;

    if !services.blogs.delete(id).await? {
        return Err(ApiError::not_found("blog", id));
    }
    tracing::info!(blog_id = %id, deleted_by = %principal.user_id, "blog post deleted");
    Ok(redirect(Endpoint::BlogList))
}
