//! Process-local cache for the category list.
//!
//! Categories change rarely and are read on every product page, so the list
//! is kept in memory until it expires or a write invalidates it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use catalog_products::{Category, NewCategory};

use crate::store::{CategoryRepository, StoreResult};

/// Read access to the category list, optionally cached.
#[async_trait]
pub trait CategoryDirectory: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Category>>;

    /// Insert through the directory so cached readers see the new row.
    async fn create(&self, new: NewCategory) -> StoreResult<Category>;

    /// Drop any cached list; the next `list` goes to the repository.
    async fn invalidate(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    /// `None` keeps the list until invalidated.
    pub ttl: Option<Duration>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: None,
        }
    }
}

pub struct CachedCategoryDirectory {
    repo: Arc<dyn CategoryRepository>,
    settings: CacheSettings,
    slot: RwLock<Option<(Instant, Vec<Category>)>>,
    /// Bumped on every invalidation, under the slot's write lock.
    generation: AtomicU64,
}

impl CachedCategoryDirectory {
    pub fn new(repo: Arc<dyn CategoryRepository>, settings: CacheSettings) -> Self {
        Self {
            repo,
            settings,
            slot: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    fn is_fresh(&self, stored_at: Instant) -> bool {
        match self.settings.ttl {
            Some(ttl) => stored_at.elapsed() < ttl,
            None => true,
        }
    }
}

#[async_trait]
impl CategoryDirectory for CachedCategoryDirectory {
    async fn list(&self) -> StoreResult<Vec<Category>> {
        if !self.settings.enabled {
            return self.repo.list().await;
        }

        if let Some((stored_at, categories)) = self.slot.read().await.as_ref() {
            if self.is_fresh(*stored_at) {
                return Ok(categories.clone());
            }
        }

        let generation = self.generation.load(Ordering::Acquire);
        let categories = self.repo.list().await?;

        // A write that landed while we were reading may not be in `categories`.
        let mut slot = self.slot.write().await;
        if self.generation.load(Ordering::Acquire) == generation {
            *slot = Some((Instant::now(), categories.clone()));
            tracing::debug!(count = categories.len(), "category cache refreshed");
        }
        Ok(categories)
    }

    async fn create(&self, new: NewCategory) -> StoreResult<Category> {
        let category = self.repo.insert(new).await?;
        self.invalidate().await;
        Ok(category)
    }

    async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    use catalog_core::CategoryId;
    use tokio::sync::Notify;

    use super::*;
    use crate::store::InMemoryCatalogStore;

    /// Counts how often the wrapped repository is listed.
    struct Counting {
        inner: InMemoryCatalogStore,
        lists: AtomicUsize,
    }

    #[async_trait]
    impl CategoryRepository for Counting {
        async fn list(&self) -> StoreResult<Vec<Category>> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            CategoryRepository::list(&self.inner).await
        }

        async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>> {
            CategoryRepository::get(&self.inner, id).await
        }

        async fn insert(&self, new: NewCategory) -> StoreResult<Category> {
            CategoryRepository::insert(&self.inner, new).await
        }
    }

    fn counting() -> Arc<Counting> {
        Arc::new(Counting {
            inner: InMemoryCatalogStore::new(),
            lists: AtomicUsize::new(0),
        })
    }

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn second_list_is_served_from_cache() {
        let repo = counting();
        let dir = CachedCategoryDirectory::new(repo.clone(), CacheSettings::default());

        dir.list().await.unwrap();
        dir.list().await.unwrap();
        assert_eq!(repo.lists.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_cache_always_reads_through() {
        let repo = counting();
        let dir = CachedCategoryDirectory::new(
            repo.clone(),
            CacheSettings {
                enabled: false,
                ttl: None,
            },
        );

        dir.list().await.unwrap();
        dir.list().await.unwrap();
        assert_eq!(repo.lists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn create_invalidates_cached_list() {
        let repo = counting();
        let dir = CachedCategoryDirectory::new(repo.clone(), CacheSettings::default());

        assert!(dir.list().await.unwrap().is_empty());
        dir.create(new_category("Уход за кожей")).await.unwrap();

        let listed = dir.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Уход за кожей");
        assert_eq!(repo.lists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_ttl_expires_immediately() {
        let repo = counting();
        let dir = CachedCategoryDirectory::new(
            repo.clone(),
            CacheSettings {
                enabled: true,
                ttl: Some(Duration::ZERO),
            },
        );

        dir.list().await.unwrap();
        dir.list().await.unwrap();
        assert_eq!(repo.lists.load(Ordering::SeqCst), 2);
    }

    /// Parks the first `list` after it has read, until released.
    struct Gated {
        inner: InMemoryCatalogStore,
        parked: AtomicBool,
        reading: Notify,
        release: Notify,
    }

    #[async_trait]
    impl CategoryRepository for Gated {
        async fn list(&self) -> StoreResult<Vec<Category>> {
            let categories = CategoryRepository::list(&self.inner).await?;
            if !self.parked.swap(true, Ordering::SeqCst) {
                self.reading.notify_one();
                self.release.notified().await;
            }
            Ok(categories)
        }

        async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>> {
            CategoryRepository::get(&self.inner, id).await
        }

        async fn insert(&self, new: NewCategory) -> StoreResult<Category> {
            CategoryRepository::insert(&self.inner, new).await
        }
    }

    #[tokio::test]
    async fn refill_started_before_a_create_is_not_cached() {
        let repo = Arc::new(Gated {
            inner: InMemoryCatalogStore::new(),
            parked: AtomicBool::new(false),
            reading: Notify::new(),
            release: Notify::new(),
        });
        let dir = Arc::new(CachedCategoryDirectory::new(repo.clone(), CacheSettings::default()));

        let slow = tokio::spawn({
            let dir = dir.clone();
            async move { dir.list().await }
        });
        repo.reading.notified().await;

        dir.create(new_category("Аксессуары")).await.unwrap();
        repo.release.notify_one();
        assert!(slow.await.unwrap().unwrap().is_empty());

        let listed = dir.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Аксессуары");
    }
}
