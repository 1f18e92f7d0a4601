//! Postgres-backed repositories.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `InvalidReference` |
//! | Database (check constraint violation) | `23514` | `Conflict` |
//! | Anything else | - | `Database` |
//!
//! Every statement runs in its own implicit transaction except
//! [`VersionRepository::apply_changes`], which wraps the whole form-set in one.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use catalog_blog::{Blog, NewBlog, Slug};
use catalog_core::{BlogId, CategoryId, ProductId, UserId, VersionId};
use catalog_products::{
    Category, NewCategory, NewProduct, NewVersion, Product, Version, VersionChanges,
};

use super::{
    BlogRepository, CategoryRepository, ProductRepository, StoreError, StoreResult,
    VersionRepository,
};

const SCHEMA: &str = include_str!("../../migrations/0001_catalog.sql");

const PRODUCT_COLUMNS: &str = "id, title, description, preview, category_id, price, is_published, owner_id, created_at, updated_at";
const BLOG_COLUMNS: &str =
    "id, title, content, preview, is_published, slug, views_count, created_at";

/// Postgres store implementing every catalog repository.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` with a small pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the schema if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PostgresCatalogStore {
    #[instrument(skip(self, new), fields(owner = %new.owner, category_id = %new.category_id), err)]
    async fn insert(&self, new: NewProduct) -> StoreResult<Product> {
        let price = price_to_db(new.price)?;
        let sql = format!(
            "INSERT INTO products (title, description, preview, category_id, price, is_published, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7, $7) RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.preview)
            .bind(new.category_id.get())
            .bind(price)
            .bind(new.owner.as_uuid())
            .bind(new.created_at)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_product", e))?;
        product_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn update(&self, product: &Product) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET title = $2,
                description = $3,
                preview = $4,
                category_id = $5,
                price = $6,
                is_published = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(product.id.get())
        .bind(&product.title)
        .bind(&product.description)
        .bind(&product.preview)
        .bind(product.category_id.get())
        .bind(price_to_db(product.price)?)
        .bind(product.is_published)
        .bind(product.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", product.id));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list_by_category(&self, category_id: CategoryId) -> StoreResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE category_id = $1 ORDER BY id");
        let rows = sqlx::query(&sql)
            .bind(category_id.get())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products_by_category", e))?;
        rows.iter().map(product_from_row).collect()
    }
}

#[async_trait]
impl VersionRepository for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn list_for_product(&self, product_id: ProductId) -> StoreResult<Vec<Version>> {
        let rows = sqlx::query(
            "SELECT id, product_id, number, name, is_current FROM product_versions WHERE product_id = $1 ORDER BY id",
        )
        .bind(product_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_versions", e))?;
        rows.iter().map(version_from_row).collect()
    }

    #[instrument(skip(self, new), fields(product_id = %new.product_id), err)]
    async fn insert(&self, new: NewVersion) -> StoreResult<Version> {
        let row = sqlx::query(
            "INSERT INTO product_versions (product_id, number, name, is_current) VALUES ($1, $2, $3, $4) \
             RETURNING id, product_id, number, name, is_current",
        )
        .bind(new.product_id.get())
        .bind(&new.number)
        .bind(&new.name)
        .bind(new.is_current)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_version", e))?;
        version_from_row(&row)
    }

    #[instrument(skip(self, version), fields(version_id = %version.id), err)]
    async fn update(&self, version: &Version) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE product_versions SET number = $2, name = $3, is_current = $4 WHERE id = $1",
        )
        .bind(version.id.get())
        .bind(&version.number)
        .bind(&version.name)
        .bind(version.is_current)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_version", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("version", version.id));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: VersionId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM product_versions WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_version", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("version", id));
        }
        Ok(())
    }

    #[instrument(
        skip(self, changes),
        fields(
            updates = changes.updates.len(),
            inserts = changes.inserts.len(),
            deletes = changes.deletes.len()
        ),
        err
    )]
    async fn apply_changes(&self, product_id: ProductId, changes: VersionChanges) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for id in &changes.deletes {
            sqlx::query("DELETE FROM product_versions WHERE id = $1 AND product_id = $2")
                .bind(id.get())
                .bind(product_id.get())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("delete_version", e))?;
        }

        for version in &changes.updates {
            sqlx::query(
                "UPDATE product_versions SET number = $3, name = $4, is_current = $5 WHERE id = $1 AND product_id = $2",
            )
            .bind(version.id.get())
            .bind(product_id.get())
            .bind(&version.number)
            .bind(&version.name)
            .bind(version.is_current)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_version", e))?;
        }

        for draft in changes.inserts {
            let new = draft.for_product(product_id);
            sqlx::query(
                "INSERT INTO product_versions (product_id, number, name, is_current) VALUES ($1, $2, $3, $4)",
            )
            .bind(new.product_id.get())
            .bind(&new.number)
            .bind(&new.name)
            .bind(new.is_current)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_version", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, description FROM categories ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_categories", e))?;
        rows.iter().map(category_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, description FROM categories WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_category", e))?;
        row.as_ref().map(category_from_row).transpose()
    }

    #[instrument(skip(self, new), err)]
    async fn insert(&self, new: NewCategory) -> StoreResult<Category> {
        let row = sqlx::query(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING id, name, description",
        )
        .bind(&new.name)
        .bind(&new.description)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_category", e))?;
        category_from_row(&row)
    }
}

#[async_trait]
impl BlogRepository for PostgresCatalogStore {
    #[instrument(skip(self, new), fields(slug = %new.slug), err)]
    async fn insert(&self, new: NewBlog) -> StoreResult<Blog> {
        let sql = format!(
            "INSERT INTO blogs (title, content, preview, is_published, slug, views_count, created_at) \
             VALUES ($1, $2, $3, $4, $5, 0, $6) RETURNING {BLOG_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&new.title)
            .bind(&new.content)
            .bind(&new.preview)
            .bind(new.is_published)
            .bind(new.slug.as_str())
            .bind(new.created_at)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_blog", e))?;
        blog_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: BlogId) -> StoreResult<Option<Blog>> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_blog", e))?;
        row.as_ref().map(blog_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<Blog>> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE slug = $1 ORDER BY id LIMIT 1");
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_blog_by_slug", e))?;
        row.as_ref().map(blog_from_row).transpose()
    }

    #[instrument(skip(self, blog), fields(blog_id = %blog.id), err)]
    async fn update(&self, blog: &Blog) -> StoreResult<()> {
        let views = i64::try_from(blog.views_count)
            .map_err(|_| StoreError::Conflict("views_count out of range".to_string()))?;
        let result = sqlx::query(
            r#"
            UPDATE blogs
            SET title = $2,
                content = $3,
                preview = $4,
                is_published = $5,
                slug = $6,
                views_count = $7
            WHERE id = $1
            "#,
        )
        .bind(blog.id.get())
        .bind(&blog.title)
        .bind(&blog.content)
        .bind(&blog.preview)
        .bind(blog.is_published)
        .bind(blog.slug.as_str())
        .bind(views)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_blog", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("blog", blog.id));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: BlogId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_blog", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn list_published(&self) -> StoreResult<Vec<Blog>> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE is_published ORDER BY id");
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_published_blogs", e))?;
        rows.iter().map(blog_from_row).collect()
    }
}

fn price_to_db(price: Option<u64>) -> StoreResult<Option<i64>> {
    price
        .map(|p| i64::try_from(p).map_err(|_| StoreError::Conflict("price out of range".to_string())))
        .transpose()
}

fn corrupt(e: impl core::fmt::Display) -> StoreError {
    StoreError::Corrupt(e.to_string())
}

fn product_from_row(row: &PgRow) -> StoreResult<Product> {
    let price: Option<i64> = row.try_get("price").map_err(corrupt)?;
    let price = price
        .map(u64::try_from)
        .transpose()
        .map_err(|_| StoreError::Corrupt("negative price".to_string()))?;
    let owner: uuid::Uuid = row.try_get("owner_id").map_err(corrupt)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(corrupt)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(corrupt)?;

    Ok(Product::restore(
        ProductId::new(row.try_get("id").map_err(corrupt)?),
        row.try_get("title").map_err(corrupt)?,
        row.try_get("description").map_err(corrupt)?,
        row.try_get("preview").map_err(corrupt)?,
        CategoryId::new(row.try_get("category_id").map_err(corrupt)?),
        price,
        row.try_get("is_published").map_err(corrupt)?,
        UserId::from_uuid(owner),
        created_at,
        updated_at,
    ))
}

fn version_from_row(row: &PgRow) -> StoreResult<Version> {
    Ok(Version {
        id: VersionId::new(row.try_get("id").map_err(corrupt)?),
        product_id: ProductId::new(row.try_get("product_id").map_err(corrupt)?),
        number: row.try_get("number").map_err(corrupt)?,
        name: row.try_get("name").map_err(corrupt)?,
        is_current: row.try_get("is_current").map_err(corrupt)?,
    })
}

fn category_from_row(row: &PgRow) -> StoreResult<Category> {
    Ok(Category {
        id: CategoryId::new(row.try_get("id").map_err(corrupt)?),
        name: row.try_get("name").map_err(corrupt)?,
        description: row.try_get("description").map_err(corrupt)?,
    })
}

fn blog_from_row(row: &PgRow) -> StoreResult<Blog> {
    let views: i64 = row.try_get("views_count").map_err(corrupt)?;
    let slug: String = row.try_get("slug").map_err(corrupt)?;
    Ok(Blog {
        id: BlogId::new(row.try_get("id").map_err(corrupt)?),
        title: row.try_get("title").map_err(corrupt)?,
        content: row.try_get("content").map_err(corrupt)?,
        preview: row.try_get("preview").map_err(corrupt)?,
        is_published: row.try_get("is_published").map_err(corrupt)?,
        slug: Slug::from_stored(slug),
        views_count: u64::try_from(views)
            .map_err(|_| StoreError::Corrupt("negative views_count".to_string()))?,
        created_at: row.try_get("created_at").map_err(corrupt)?,
    })
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23514") => StoreError::Conflict(msg),
                Some("23503") => StoreError::InvalidReference(msg),
                _ => StoreError::Database {
                    operation,
                    message: msg,
                },
            }
        }
        other => StoreError::Database {
            operation,
            message: other.to_string(),
        },
    }
}
