//! Product catalog boundary
//!
//! The catalog is an external collaborator: the cart joins against it at
//! read time for display data, and nothing in this crate ever mutates a
//! product. Order placement deliberately does not consult it — line prices
//! are the caller's at-order-time snapshot.

use crate::core::error::StoreResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::core::error::StorageError;

/// Presentation data for a product, as served by the catalog component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    /// Primary image, when one is set
    pub image_url: Option<String>,
    pub category_name: Option<String>,
}

/// Read-only product lookup used to enrich cart views.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Current presentation data for a product, or `None` if the catalog
    /// no longer knows the product (its cart lines are then hidden from
    /// the view, though they remain stored).
    async fn product_info(&self, product_id: i64) -> StoreResult<Option<ProductInfo>>;
}

/// In-memory catalog for tests, demos and development.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<i64, ProductInfo>>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product
    pub fn insert(&self, product_id: i64, info: ProductInfo) {
        if let Ok(mut products) = self.products.write() {
            products.insert(product_id, info);
        }
    }

    /// Remove a product, simulating a delisting
    pub fn remove(&self, product_id: i64) {
        if let Ok(mut products) = self.products.write() {
            products.remove(&product_id);
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn product_info(&self, product_id: i64) -> StoreResult<Option<ProductInfo>> {
        let products = self
            .products
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(products.get(&product_id).cloned())
    }
}
