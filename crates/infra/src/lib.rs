//! Infrastructure layer: repositories (in-memory and Postgres) and the
//! category cache.

pub mod cache;
pub mod store;

pub use cache::{CacheSettings, CachedCategoryDirectory, CategoryDirectory};
pub use store::{
    BlogRepository, CategoryRepository, InMemoryCatalogStore, PostgresCatalogStore,
    ProductRepository, StoreError, StoreResult, VersionRepository,
};
