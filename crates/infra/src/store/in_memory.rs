//! In-memory repositories for tests/dev.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use catalog_blog::{Blog, NewBlog};
use catalog_core::{BlogId, CategoryId, Entity, ProductId, VersionId};
use catalog_products::{Category, NewCategory, NewProduct, NewVersion, Product, Version};

use super::{
    BlogRepository, CategoryRepository, ProductRepository, StoreError, StoreResult,
    VersionRepository,
};

fn poisoned(operation: &'static str) -> StoreError {
    StoreError::Database {
        operation,
        message: "lock poisoned".to_string(),
    }
}

/// Ordered in-memory table keyed by a serial id.
#[derive(Debug)]
pub struct InMemoryTable<E: Entity> {
    rows: RwLock<BTreeMap<E::Id, E>>,
    next_id: AtomicI64,
}

impl<E: Entity> InMemoryTable<E> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl<E: Entity> Default for InMemoryTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryTable<E>
where
    E: Entity + Clone,
    E::Id: Ord + From<i64>,
{
    /// Assign the next id and store the record built from it.
    pub fn insert_with(&self, build: impl FnOnce(E::Id) -> E) -> StoreResult<E> {
        let mut rows = self.rows.write().map_err(|_| poisoned("insert"))?;
        let id = E::Id::from(self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = build(id);
        rows.insert(id, record.clone());
        Ok(record)
    }

    /// Store a record under its own id (seeding fixed identifiers).
    ///
    /// Later `insert_with` ids continue after the highest seeded one.
    pub fn put(&self, record: E) -> StoreResult<()>
    where
        E::Id: Into<i64>,
    {
        let mut rows = self.rows.write().map_err(|_| poisoned("put"))?;
        let raw: i64 = record.id().into();
        self.next_id.fetch_max(raw + 1, Ordering::SeqCst);
        rows.insert(record.id(), record);
        Ok(())
    }

    pub fn get(&self, id: E::Id) -> StoreResult<Option<E>> {
        let rows = self.rows.read().map_err(|_| poisoned("get"))?;
        Ok(rows.get(&id).cloned())
    }

    /// Replace an existing record; `Ok(false)` when it does not exist.
    pub fn replace(&self, record: E) -> StoreResult<bool> {
        let mut rows = self.rows.write().map_err(|_| poisoned("replace"))?;
        match rows.get_mut(&record.id()) {
            Some(slot) => {
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn remove(&self, id: E::Id) -> StoreResult<bool> {
        let mut rows = self.rows.write().map_err(|_| poisoned("remove"))?;
        Ok(rows.remove(&id).is_some())
    }

    /// All records matching `keep`, in id order.
    pub fn filter(&self, keep: impl Fn(&E) -> bool) -> StoreResult<Vec<E>> {
        let rows = self.rows.read().map_err(|_| poisoned("filter"))?;
        Ok(rows.values().filter(|r| keep(r)).cloned().collect())
    }
}

/// All catalog tables in one process-local store.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    pub products: InMemoryTable<Product>,
    pub versions: InMemoryTable<Version>,
    pub categories: InMemoryTable<Category>,
    pub blogs: InMemoryTable<Blog>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalogStore {
    async fn insert(&self, new: NewProduct) -> StoreResult<Product> {
        if self.categories.get(new.category_id)?.is_none() {
            return Err(StoreError::InvalidReference(format!(
                "category {} does not exist",
                new.category_id
            )));
        }
        self.products.insert_with(|id| new.into_product(id))
    }

    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        self.products.get(id)
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        if self.products.replace(product.clone())? {
            Ok(())
        } else {
            Err(StoreError::not_found("product", product.id))
        }
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        self.products.filter(|_| true)
    }

    async fn list_by_category(&self, category_id: CategoryId) -> StoreResult<Vec<Product>> {
        self.products.filter(|p| p.category_id == category_id)
    }
}

#[async_trait]
impl VersionRepository for InMemoryCatalogStore {
    async fn list_for_product(&self, product_id: ProductId) -> StoreResult<Vec<Version>> {
        self.versions.filter(|v| v.product_id == product_id)
    }

    async fn insert(&self, new: NewVersion) -> StoreResult<Version> {
        if self.products.get(new.product_id)?.is_none() {
            return Err(StoreError::InvalidReference(format!(
                "product {} does not exist",
                new.product_id
            )));
        }
        self.versions.insert_with(|id| new.into_version(id))
    }

    async fn update(&self, version: &Version) -> StoreResult<()> {
        if self.versions.replace(version.clone())? {
            Ok(())
        } else {
            Err(StoreError::not_found("version", version.id))
        }
    }

    async fn delete(&self, id: VersionId) -> StoreResult<()> {
        if self.versions.remove(id)? {
            Ok(())
        } else {
            Err(StoreError::not_found("version", id))
        }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCatalogStore {
    async fn list(&self) -> StoreResult<Vec<Category>> {
        self.categories.filter(|_| true)
    }

    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        self.categories.get(id)
    }

    async fn insert(&self, new: NewCategory) -> StoreResult<Category> {
        self.categories.insert_with(|id| new.into_category(id))
    }
}

#[async_trait]
impl BlogRepository for InMemoryCatalogStore {
    async fn insert(&self, new: NewBlog) -> StoreResult<Blog> {
        self.blogs.insert_with(|id| new.into_blog(id))
    }

    async fn get(&self, id: BlogId) -> StoreResult<Option<Blog>> {
        self.blogs.get(id)
    }

    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<Blog>> {
        Ok(self
            .blogs
            .filter(|b| b.slug.as_str() == slug)?
            .into_iter()
            .next())
    }

    async fn update(&self, blog: &Blog) -> StoreResult<()> {
        if self.blogs.replace(blog.clone())? {
            Ok(())
        } else {
            Err(StoreError::not_found("blog", blog.id))
        }
    }

    async fn delete(&self, id: BlogId) -> StoreResult<bool> {
        self.blogs.remove(id)
    }

    async fn list_published(&self) -> StoreResult<Vec<Blog>> {
        self.blogs.filter(|b| b.is_published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_blog::BlogForm;
    use catalog_core::UserId;
    use catalog_products::{VersionChanges, VersionDraft};
    use chrono::Utc;

    fn seed_category(store: &InMemoryCatalogStore, id: i64, name: &str) {
        store
            .categories
            .put(Category {
                id: CategoryId::new(id),
                name: name.into(),
                description: None,
            })
            .unwrap();
    }

    fn new_product(category: i64, owner: UserId) -> NewProduct {
        NewProduct {
            title: "Cream".into(),
            description: String::new(),
            preview: None,
            category_id: CategoryId::new(category),
            price: None,
            owner,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn inserted_product_keeps_owner_and_gets_serial_id() {
        let store = InMemoryCatalogStore::new();
        seed_category(&store, 5, "Skin");
        let owner = UserId::new();

        let a = ProductRepository::insert(&store, new_product(5, owner)).await.unwrap();
        let b = ProductRepository::insert(&store, new_product(5, owner)).await.unwrap();

        assert_eq!(a.id, ProductId::new(1));
        assert_eq!(b.id, ProductId::new(2));
        let stored = ProductRepository::get(&store, a.id).await.unwrap().unwrap();
        assert_eq!(stored.owner(), owner);
    }

    #[tokio::test]
    async fn product_insert_rejects_unknown_category() {
        let store = InMemoryCatalogStore::new();
        let err = ProductRepository::insert(&store, new_product(99, UserId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference(_)));
        assert!(ProductRepository::list(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_by_category_filters_exactly() {
        let store = InMemoryCatalogStore::new();
        seed_category(&store, 5, "Skin");
        seed_category(&store, 6, "Hygiene");
        let owner = UserId::new();
        ProductRepository::insert(&store, new_product(5, owner)).await.unwrap();
        ProductRepository::insert(&store, new_product(6, owner)).await.unwrap();
        ProductRepository::insert(&store, new_product(5, owner)).await.unwrap();

        let skin = store.list_by_category(CategoryId::new(5)).await.unwrap();
        assert_eq!(skin.len(), 2);
        assert!(skin.iter().all(|p| p.category_id == CategoryId::new(5)));
    }

    #[tokio::test]
    async fn seeded_ids_do_not_collide_with_generated_ones() {
        let store = InMemoryCatalogStore::new();
        seed_category(&store, 7, "Home");
        let generated = CategoryRepository::insert(
            &store,
            NewCategory {
                name: "New".into(),
                description: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(generated.id, CategoryId::new(8));
    }

    #[tokio::test]
    async fn apply_changes_updates_inserts_and_deletes() {
        let store = InMemoryCatalogStore::new();
        seed_category(&store, 5, "Skin");
        let product = ProductRepository::insert(&store, new_product(5, UserId::new()))
            .await
            .unwrap();
        let v1 = VersionRepository::insert(
            &store,
            NewVersion {
                product_id: product.id,
                number: "1.0".into(),
                name: "First".into(),
                is_current: true,
            },
        )
        .await
        .unwrap();
        let v2 = VersionRepository::insert(
            &store,
            NewVersion {
                product_id: product.id,
                number: "1.1".into(),
                name: "Second".into(),
                is_current: false,
            },
        )
        .await
        .unwrap();

        let mut renamed = v1.clone();
        renamed.is_current = false;
        let changes = VersionChanges {
            updates: vec![renamed],
            inserts: vec![VersionDraft {
                number: "2.0".into(),
                name: "Third".into(),
                is_current: true,
            }],
            deletes: vec![v2.id],
        };
        store.apply_changes(product.id, changes).await.unwrap();

        let versions = store.list_for_product(product.id).await.unwrap();
        assert_eq!(versions.len(), 2);
        assert!(!versions[0].is_current);
        assert_eq!(versions[1].number, "2.0");
        assert!(versions[1].is_current);
    }

    #[tokio::test]
    async fn blog_lookup_by_slug_and_published_listing() {
        let store = InMemoryCatalogStore::new();
        let form = BlogForm {
            title: "Двойное очищение".into(),
            content: "Масло, затем пенка.".into(),
            preview: None,
        };
        let post = BlogRepository::insert(&store, form.into_new_blog(Utc::now()))
            .await
            .unwrap();

        let mut hidden = post.clone();
        hidden.is_published = false;
        let hidden = BlogRepository::insert(
            &store,
            NewBlog {
                title: hidden.title,
                content: hidden.content,
                preview: None,
                is_published: false,
                slug: hidden.slug,
                created_at: hidden.created_at,
            },
        )
        .await
        .unwrap();

        let by_slug = store.get_by_slug(post.slug.as_str()).await.unwrap().unwrap();
        assert_eq!(by_slug.id, post.id);

        let published = store.list_published().await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, post.id);

        assert!(BlogRepository::delete(&store, hidden.id).await.unwrap());
        assert!(!BlogRepository::delete(&store, hidden.id).await.unwrap());
    }
}
