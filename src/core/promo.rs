//! Promo code types and discount math
//!
//! Validation and consumption are separate operations: `validate` decides
//! applicability and computes the discount without touching usage state, so
//! the frontend can preview a discount before checkout commits it.

use crate::core::money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a promo code discounts an order amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `order_amount * discount_value / 100`
    Percentage,
    /// Flat `discount_value`, NOT capped at the order amount
    /// (matching the storefront's historical behavior)
    FixedAmount,
}

/// A promo code row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    /// Unique, case-sensitive as stored
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub minimum_order_amount: Decimal,
    /// `None` = unlimited
    pub usage_limit: Option<i64>,
    pub used_count: i64,
    pub valid_from: DateTime<Utc>,
    /// `None` = no expiry
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl PromoCode {
    /// Whether this code can be applied to an order of `order_amount` at
    /// `now`. One conjunction; callers are not told which predicate failed.
    pub fn is_applicable(&self, order_amount: Decimal, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.valid_from <= now
            && self.valid_until.is_none_or(|until| until > now)
            && self.minimum_order_amount <= order_amount
            && self.has_usage_headroom()
    }

    /// Whether the usage limit (if any) still has headroom.
    pub fn has_usage_headroom(&self) -> bool {
        self.usage_limit.is_none_or(|limit| self.used_count < limit)
    }

    /// The discount this code yields against `order_amount`.
    ///
    /// A fixed amount is returned as-is even when it exceeds the order
    /// amount; the caller sees a discount larger than the subtotal.
    pub fn discount_for(&self, order_amount: Decimal) -> Decimal {
        match self.discount_type {
            DiscountType::Percentage => money::percentage_of(order_amount, self.discount_value),
            DiscountType::FixedAmount => money::round_money(self.discount_value),
        }
    }
}

/// Parameters for creating a promo code (admin surface).
#[derive(Debug, Clone, Deserialize)]
pub struct NewPromoCode {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub minimum_order_amount: Decimal,
    #[serde(default)]
    pub usage_limit: Option<i64>,
    pub valid_from: DateTime<Utc>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}

impl NewPromoCode {
    /// Materialize a code row: active, unused, created now.
    pub fn into_promo_code(self) -> PromoCode {
        PromoCode {
            code: self.code,
            description: self.description,
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            minimum_order_amount: self.minimum_order_amount,
            usage_limit: self.usage_limit,
            used_count: 0,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Result of a successful validation: the code plus the discount it yields.
#[derive(Debug, Clone, Serialize)]
pub struct PromoValidation {
    pub promo_code: PromoCode,
    pub discount_amount: Decimal,
}
