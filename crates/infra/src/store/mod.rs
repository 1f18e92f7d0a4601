//! Persistence collaborator: repositories for products, versions, categories
//! and blog posts.
//!
//! Every call is its own implicit transaction, except
//! [`VersionRepository::apply_changes`], which backends may run atomically.

use async_trait::async_trait;
use thiserror::Error;

use catalog_blog::{Blog, NewBlog};
use catalog_core::{BlogId, CategoryId, ProductId, VersionId};
use catalog_products::{Category, NewCategory, NewProduct, NewVersion, Product, Version, VersionChanges};

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryCatalogStore, InMemoryTable};
pub use postgres::PostgresCatalogStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl core::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Single insert; the owner travels with the record.
    async fn insert(&self, new: NewProduct) -> StoreResult<Product>;
    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>>;
    async fn update(&self, product: &Product) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<Product>>;
    async fn list_by_category(&self, category_id: CategoryId) -> StoreResult<Vec<Product>>;
}

#[async_trait]
pub trait VersionRepository: Send + Sync {
    async fn list_for_product(&self, product_id: ProductId) -> StoreResult<Vec<Version>>;
    async fn insert(&self, new: NewVersion) -> StoreResult<Version>;
    async fn update(&self, version: &Version) -> StoreResult<()>;
    async fn delete(&self, id: VersionId) -> StoreResult<()>;

    /// Apply a validated form-set to a saved product.
    async fn apply_changes(&self, product_id: ProductId, changes: VersionChanges) -> StoreResult<()> {
        for id in changes.deletes {
            self.delete(id).await?;
        }
        for version in &changes.updates {
            self.update(version).await?;
        }
        for draft in changes.inserts {
            self.insert(draft.for_product(product_id)).await?;
        }
        Ok(())
    }
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Category>>;
    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>>;
    async fn insert(&self, new: NewCategory) -> StoreResult<Category>;
}

#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn insert(&self, new: NewBlog) -> StoreResult<Blog>;
    async fn get(&self, id: BlogId) -> StoreResult<Option<Blog>>;
    /// Oldest post carrying `slug`, if any.
    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<Blog>>;
    async fn update(&self, blog: &Blog) -> StoreResult<()>;
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: BlogId) -> StoreResult<bool>;
    async fn list_published(&self) -> StoreResult<Vec<Blog>>;
}
