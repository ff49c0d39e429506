//! Shared test harness for the storefront integration tests
//!
//! Provides a seeded catalog, wired-up in-memory services, and factory
//! helpers for promo codes and checkout requests.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod harness;
//! use harness::*;
//! ```

#![allow(dead_code)]

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use storefront::core::order::{NewOrder, NewOrderItem};
use storefront::core::product::{InMemoryCatalog, ProductInfo};
use storefront::core::promo::{DiscountType, NewPromoCode};
use storefront::storage::{InMemoryCartService, InMemoryOrderService, InMemoryPromoService};

/// Product ids seeded into [`seeded_catalog`].
pub const MASK: i64 = 1;
pub const SARONG: i64 = 2;
pub const JEWELRY: i64 = 3;

/// A catalog with three products: mask (4500), sarong (3200),
/// jewelry (7800).
pub fn seeded_catalog() -> Arc<InMemoryCatalog> {
    let catalog = InMemoryCatalog::new();
    catalog.insert(
        MASK,
        ProductInfo {
            name: "Raksha Devil Mask".to_string(),
            price: dec!(4500),
            original_price: Some(dec!(5200)),
            image_url: Some("/images/raksha-devil.jpg".to_string()),
            category_name: Some("Masks".to_string()),
        },
    );
    catalog.insert(
        SARONG,
        ProductInfo {
            name: "Handwoven Batik Sarong".to_string(),
            price: dec!(3200),
            original_price: None,
            image_url: None,
            category_name: Some("Textiles".to_string()),
        },
    );
    catalog.insert(
        JEWELRY,
        ProductInfo {
            name: "Silver Temple Jewelry".to_string(),
            price: dec!(7800),
            original_price: None,
            image_url: None,
            category_name: Some("Jewelry".to_string()),
        },
    );
    Arc::new(catalog)
}

/// The full in-memory stack: catalog, carts, promos, orders.
pub struct Stack {
    pub catalog: Arc<InMemoryCatalog>,
    pub carts: Arc<InMemoryCartService>,
    pub promos: Arc<InMemoryPromoService>,
    pub orders: Arc<InMemoryOrderService>,
}

/// Wire up the in-memory services against a seeded catalog.
pub fn stack() -> Stack {
    let catalog = seeded_catalog();
    let carts = Arc::new(InMemoryCartService::new(catalog.clone()));
    let promos = Arc::new(InMemoryPromoService::new());
    let orders = Arc::new(InMemoryOrderService::new(
        carts.clone(),
        promos.clone(),
        "KP",
    ));
    Stack {
        catalog,
        carts,
        promos,
        orders,
    }
}

/// A currently-valid percentage promo code.
pub fn percentage_promo(code: &str, percent: Decimal, minimum: Decimal) -> NewPromoCode {
    NewPromoCode {
        code: code.to_string(),
        description: None,
        discount_type: DiscountType::Percentage,
        discount_value: percent,
        minimum_order_amount: minimum,
        usage_limit: None,
        valid_from: Utc::now() - Duration::days(1),
        valid_until: None,
    }
}

/// A currently-valid fixed-amount promo code.
pub fn fixed_promo(code: &str, amount: Decimal) -> NewPromoCode {
    NewPromoCode {
        code: code.to_string(),
        description: None,
        discount_type: DiscountType::FixedAmount,
        discount_value: amount,
        minimum_order_amount: dec!(0),
        usage_limit: None,
        valid_from: Utc::now() - Duration::days(1),
        valid_until: None,
    }
}

/// A two-line checkout: 2 masks + 1 sarong, subtotal 12200, shipping 500,
/// total 12700.
pub fn two_line_checkout(user_id: Option<i64>) -> NewOrder {
    NewOrder {
        user_id,
        items: vec![
            NewOrderItem {
                product_id: MASK,
                quantity: 2,
                price: dec!(4500),
                total: dec!(9000),
            },
            NewOrderItem {
                product_id: SARONG,
                quantity: 1,
                price: dec!(3200),
                total: dec!(3200),
            },
        ],
        subtotal: dec!(12200),
        discount_amount: dec!(0),
        shipping_amount: dec!(500),
        tax_amount: dec!(0),
        total_amount: dec!(12700),
        shipping_address: "12 Temple Rd, Kandy".to_string(),
        billing_address: "12 Temple Rd, Kandy".to_string(),
        notes: None,
        promo_code: None,
    }
}

/// Apply a discount to a checkout request, keeping the totals consistent.
pub fn with_discount(mut order: NewOrder, code: &str, discount: Decimal) -> NewOrder {
    order.promo_code = Some(code.to_string());
    order.discount_amount = discount;
    order.total_amount =
        order.subtotal - discount + order.shipping_amount + order.tax_amount;
    order
}
