//! Order types, order numbers, and totals verification
//!
//! An order and its items are persisted as one atomic unit; no partial
//! order is ever visible. Monetary fields arrive from the caller (the
//! checkout UI computes them for display) but are re-verified server-side
//! before anything persists — see [`verify_totals`].

use crate::core::error::{OrderError, StoreResult};
use crate::core::money;
use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status values.
///
/// The lifecycle is open-ended: statuses move `pending` → `processing` →
/// `shipped` → `completed` under admin control, but no transition graph is
/// enforced and unknown values are stored as-is.
pub mod status {
    pub const PENDING: &str = "pending";
    pub const PROCESSING: &str = "processing";
    pub const SHIPPED: &str = "shipped";
    pub const COMPLETED: &str = "completed";
}

/// A persisted order header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    /// `None` for guest checkouts
    pub user_id: Option<i64>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub shipping_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub billing_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted order line item.
///
/// `price` is the unit price at order time, decoupled from the live
/// catalog price; `total` is `price * quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: i64,
    pub quantity: i64,
    pub price: Decimal,
    pub total: Decimal,
}

/// An order header with its aggregate item count, for order listings.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    pub item_count: i64,
}

/// An order header with its full item list.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// One line of a checkout request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price snapshot supplied by the caller
    pub price: Decimal,
    /// Expected to equal `price * quantity`; verified before persisting
    pub total: Decimal,
}

/// A checkout request: items, addresses, and caller-computed totals.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewOrder {
    #[serde(default)]
    pub user_id: Option<i64>,
    pub items: Vec<NewOrderItem>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub shipping_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub billing_address: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// When set, the discount must match this code's computed discount
    #[serde(default)]
    pub promo_code: Option<String>,
}

/// What checkout returns to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub order_number: String,
}

// =============================================================================
// Order numbers
// =============================================================================

/// How many fresh order numbers to draw before giving up on a collision.
pub const ORDER_NUMBER_ATTEMPTS: u32 = 8;

/// Generate a candidate order number: prefix + 4-digit year + zero-padded
/// random 1–9999 suffix (e.g. `KP20260042`).
///
/// Uniqueness is NOT guaranteed by construction; storage backends check the
/// candidate against existing orders and redraw up to
/// [`ORDER_NUMBER_ATTEMPTS`] times.
pub fn generate_order_number(prefix: &str, now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::rng().random_range(1..=9999);
    format!("{}{}{:04}", prefix, now.year(), suffix)
}

// =============================================================================
// Totals verification
// =============================================================================

/// Verify the caller-supplied monetary fields against server-side
/// recomputation, within the rounding tolerance:
///
/// - every item's `total` must equal `price * quantity`;
/// - `subtotal` must equal the sum of item totals;
/// - `discount_amount` must equal `expected_discount` (the re-validated
///   promo discount, or zero when no code was supplied);
/// - `total_amount` must equal `subtotal - discount + shipping + tax`.
///
/// The first divergence is reported as a `TotalsMismatch`; nothing about
/// the order persists when this fails.
pub fn verify_totals(order: &NewOrder, expected_discount: Decimal) -> StoreResult<()> {
    let mut items_sum = Decimal::ZERO;
    for item in &order.items {
        let line_total = money::round_money(item.price * Decimal::from(item.quantity));
        if !money::amounts_match(line_total, item.total) {
            return Err(OrderError::TotalsMismatch {
                field: "item.total",
                expected: line_total,
                supplied: item.total,
            }
            .into());
        }
        items_sum += item.total;
    }

    if !money::amounts_match(items_sum, order.subtotal) {
        return Err(OrderError::TotalsMismatch {
            field: "subtotal",
            expected: items_sum,
            supplied: order.subtotal,
        }
        .into());
    }

    if !money::amounts_match(expected_discount, order.discount_amount) {
        return Err(OrderError::TotalsMismatch {
            field: "discount_amount",
            expected: expected_discount,
            supplied: order.discount_amount,
        }
        .into());
    }

    let expected_total = money::round_money(
        order.subtotal - order.discount_amount + order.shipping_amount + order.tax_amount,
    );
    if !money::amounts_match(expected_total, order.total_amount) {
        return Err(OrderError::TotalsMismatch {
            field: "total_amount",
            expected: expected_total,
            supplied: order.total_amount,
        }
        .into());
    }

    Ok(())
}
