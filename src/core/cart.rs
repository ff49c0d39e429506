//! Cart types
//!
//! A cart is the set of [`CartLine`]s owned by one [`CartIdentity`]. The
//! merge invariant holds throughout: at most one line per (identity,
//! product) pair, with repeated adds folded into the quantity.

use crate::core::identity::CartIdentity;
use crate::core::product::ProductInfo;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product entry in an identity's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Uuid,
    #[serde(flatten)]
    pub identity: CartLineOwner,
    pub product_id: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape of a line's owner: exactly one of the two fields set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineOwner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl CartLine {
    /// Create a new line with a fresh id and current timestamps.
    pub fn new(identity: &CartIdentity, product_id: i64, quantity: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            identity: CartLineOwner::from(identity),
            product_id,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// The owning identity.
    pub fn owner(&self) -> CartIdentity {
        match (self.identity.user_id, &self.identity.session_id) {
            (Some(uid), _) => CartIdentity::User(uid),
            (None, Some(sid)) => CartIdentity::Session(sid.clone()),
            // A line is only ever constructed from a resolved identity.
            (None, None) => unreachable!("cart line without an owner"),
        }
    }

    /// Refresh the updated_at timestamp after a mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl From<&CartIdentity> for CartLineOwner {
    fn from(identity: &CartIdentity) -> Self {
        match identity {
            CartIdentity::User(uid) => Self {
                user_id: Some(*uid),
                session_id: None,
            },
            CartIdentity::Session(sid) => Self {
                user_id: None,
                session_id: Some(sid.clone()),
            },
        }
    }
}

/// A cart line joined with live catalog data, as returned by cart reads.
///
/// Lines whose product the catalog no longer knows are omitted from views;
/// image and category are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemView {
    pub id: Uuid,
    pub product_id: i64,
    pub quantity: i64,
    pub name: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

impl CartItemView {
    /// Join a line with its product's presentation data.
    pub fn from_line(line: &CartLine, info: &ProductInfo) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            quantity: line.quantity,
            name: info.name.clone(),
            price: info.price,
            original_price: info.original_price,
            image_url: info.image_url.clone(),
            category_name: info.category_name.clone(),
        }
    }
}
