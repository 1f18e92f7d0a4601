//! Infrastructure wiring: repositories and the category directory, chosen by
//! configuration.

use std::sync::Arc;

use anyhow::Context;

use catalog_infra::{
    BlogRepository, CachedCategoryDirectory, CategoryDirectory, CategoryRepository,
    InMemoryCatalogStore, PostgresCatalogStore, ProductRepository, VersionRepository,
};
use catalog_products::{Category, ProductGroup};

use crate::config::{ApiConfig, GroupCategories, StoreConfig};

const POSTGRES_MAX_CONNECTIONS: u32 = 10;

#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<dyn ProductRepository>,
    pub versions: Arc<dyn VersionRepository>,
    pub blogs: Arc<dyn BlogRepository>,
    pub categories: Arc<dyn CategoryDirectory>,
    pub groups: GroupCategories,
}

impl AppServices {
    /// Category-existence predicate for form validation, read through the cache.
    pub async fn category_exists(
        &self,
    ) -> Result<impl Fn(catalog_core::CategoryId) -> bool, catalog_infra::StoreError> {
        let categories = self.categories.list().await?;
        Ok(move |id| categories.iter().any(|c| c.id == id))
    }
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    match &config.store {
        StoreConfig::InMemory => {
            tracing::info!("using in-memory stores");
            let store = Arc::new(InMemoryCatalogStore::new());
            seed_group_categories(&store, config.groups)?;
            Ok(wire(store, config))
        }
        StoreConfig::Postgres { database_url } => {
            tracing::info!("using postgres stores");
            let store = PostgresCatalogStore::connect(database_url, POSTGRES_MAX_CONNECTIONS)
                .await
                .context("failed to connect to Postgres")?;
            store.migrate().await.context("failed to apply schema")?;
            Ok(wire(Arc::new(store), config))
        }
    }
}

fn wire<S>(store: Arc<S>, config: &ApiConfig) -> AppServices
where
    S: ProductRepository + VersionRepository + BlogRepository + CategoryRepository + 'static,
{
    let category_repo: Arc<dyn CategoryRepository> = store.clone();
    AppServices {
        products: store.clone(),
        versions: store.clone(),
        blogs: store,
        categories: Arc::new(CachedCategoryDirectory::new(category_repo, config.cache)),
        groups: config.groups,
    }
}

/// Dev/test stores start with the three listing categories at their
/// configured ids.
fn seed_group_categories(store: &InMemoryCatalogStore, groups: GroupCategories) -> anyhow::Result<()> {
    for group in ProductGroup::ALL {
        store
            .categories
            .put(Category {
                id: groups.category_for(group),
                name: group.page_title().to_string(),
                description: None,
            })
            .context("failed to seed categories")?;
    }
    Ok(())
}
