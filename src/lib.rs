//! # Storefront
//!
//! The core of an e-commerce storefront: merge-by-identity shopping carts,
//! promo-code validation, and atomic order placement, exposed over a small
//! REST API.
//!
//! ## Features
//!
//! - **Merge-by-identity carts**: at most one line per (identity, product);
//!   repeated adds fold into the quantity via an atomic upsert
//! - **Guest and user carts**: keyed by a numeric user id or an opaque
//!   session id, never both
//! - **Promo codes**: percentage or fixed-amount discounts with validity
//!   windows, minimum order amounts, and race-safe usage limits
//! - **Atomic checkout**: order header and items persist together or not at
//!   all; totals are re-verified server-side before anything commits
//! - **Pluggable storage**: in-memory by default, PostgreSQL behind the
//!   `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! let catalog = Arc::new(InMemoryCatalog::new());
//! catalog.insert(1, ProductInfo {
//!     name: "Raksha Devil Mask".to_string(),
//!     price: dec!(4500),
//!     original_price: None,
//!     image_url: None,
//!     category_name: Some("Masks".to_string()),
//! });
//!
//! ServerBuilder::in_memory(catalog).serve().await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core types ===
    pub use crate::core::{
        cart::{CartItemView, CartLine},
        error::{CartError, OrderError, PromoError, StoreError, StoreResult},
        identity::CartIdentity,
        order::{
            NewOrder, NewOrderItem, Order, OrderDetails, OrderItem, OrderReceipt, OrderSummary,
        },
        product::{InMemoryCatalog, ProductCatalog, ProductInfo},
        promo::{DiscountType, NewPromoCode, PromoCode, PromoValidation},
        service::{CartService, OrderService, PromoService},
    };

    // === Storage ===
    pub use crate::storage::{InMemoryCartService, InMemoryOrderService, InMemoryPromoService};
    #[cfg(feature = "postgres")]
    pub use crate::storage::{PostgresCartService, PostgresOrderService, PostgresPromoService};

    // === Config ===
    pub use crate::config::StoreConfig;

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
