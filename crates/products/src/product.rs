use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{CategoryId, Entity, ProductId, UserId};

/// Catalog product.
///
/// `owner` is fixed at creation; no form variant can reassign it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub preview: Option<String>,
    pub category_id: CategoryId,
    /// Price in minor currency units.
    pub price: Option<u64>,
    pub is_published: bool,
    owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Rehydrate a stored product (storage adapters only).
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ProductId,
        title: String,
        description: String,
        preview: Option<String>,
        category_id: CategoryId,
        price: Option<u64>,
        is_published: bool,
        owner: UserId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            preview,
            category_id,
            price,
            is_published,
            owner,
            created_at,
            updated_at,
        }
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// A validated product ready for its single insert.
///
/// The owner is part of the record before anything is written, so a stored
/// product is never unowned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub preview: Option<String>,
    pub category_id: CategoryId,
    pub price: Option<u64>,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
}

impl NewProduct {
    /// Materialise the stored record once the store has assigned an id.
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            preview: self.preview,
            category_id: self.category_id,
            price: self.price,
            is_published: false,
            owner: self.owner,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
