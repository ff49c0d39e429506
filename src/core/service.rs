//! Service traits for cart, promo, and order operations
//!
//! Implementations provide the storefront's three workflows over a specific
//! storage backend. The core is agnostic to the storage mechanism; every
//! operation is a self-contained unit of work, and only order placement
//! spans multiple statements (and must be atomic).

use crate::core::cart::{CartItemView, CartLine};
use crate::core::error::StoreResult;
use crate::core::identity::CartIdentity;
use crate::core::order::{NewOrder, OrderDetails, OrderReceipt, OrderSummary};
use crate::core::promo::{NewPromoCode, PromoCode, PromoValidation};
use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Per-identity product-quantity mappings.
#[async_trait]
pub trait CartService: Send + Sync {
    /// The identity's cart, joined with current catalog data.
    ///
    /// Pure: no side effects, stable across calls absent mutation. Lines
    /// whose product the catalog no longer carries are omitted.
    async fn cart(&self, identity: &CartIdentity) -> StoreResult<Vec<CartItemView>>;

    /// Add `quantity` of a product, merging into an existing line.
    ///
    /// The insert-or-increment is atomic per (identity, product): at most
    /// one line per pair survives any interleaving of concurrent adds.
    /// Fails with `InvalidQuantity` when `quantity <= 0`.
    async fn add(
        &self,
        identity: &CartIdentity,
        product_id: i64,
        quantity: i64,
    ) -> StoreResult<CartLine>;

    /// Overwrite a line's quantity; a quantity of zero or less removes the
    /// line instead. Fails with `LineNotFound` if the line does not belong
    /// to the identity.
    async fn set_quantity(
        &self,
        identity: &CartIdentity,
        line_id: Uuid,
        quantity: i64,
    ) -> StoreResult<()>;

    /// Delete a line. Removing an absent line is a no-op, not an error.
    async fn remove_line(&self, identity: &CartIdentity, line_id: Uuid) -> StoreResult<()>;

    /// Delete every line belonging to the identity.
    async fn clear(&self, identity: &CartIdentity) -> StoreResult<()>;
}

/// Promo code validation, consumption, and admin management.
#[async_trait]
pub trait PromoService: Send + Sync {
    /// Decide whether `code` applies to an order of `order_amount` and
    /// compute the discount. Does not mutate usage state.
    ///
    /// Fails with `PromoError::NotFound` for unknown codes and
    /// `PromoError::Inapplicable` when any applicability predicate fails;
    /// the HTTP surface collapses both into "invalid or expired".
    async fn validate(&self, code: &str, order_amount: Decimal) -> StoreResult<PromoValidation>;

    /// Record one use of the code.
    ///
    /// The increment is conditional and atomic: when a usage limit exists
    /// and is already reached, nothing changes and the call fails with
    /// `PromoError::Inapplicable`, so the limit cannot be exceeded by
    /// concurrent checkouts.
    async fn consume(&self, code: &str) -> StoreResult<()>;

    /// Create a promo code (admin).
    async fn create(&self, promo: NewPromoCode) -> StoreResult<PromoCode>;

    /// All promo codes, newest first (admin).
    async fn list(&self) -> StoreResult<Vec<PromoCode>>;
}

/// Order placement and back-office order access.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Place an order: verify totals (re-validating the promo code when one
    /// is supplied), allocate a unique order number, persist the header and
    /// items as one atomic unit, consume the promo code, and clear the
    /// user's cart.
    ///
    /// All-or-nothing: on any failure nothing persists and no usage is
    /// consumed. Guest carts (session identities) are not cleared — the
    /// request carries no session identity to clear by.
    async fn place(&self, order: NewOrder) -> StoreResult<OrderReceipt>;

    /// One order with its items.
    async fn order(&self, id: Uuid) -> StoreResult<OrderDetails>;

    /// Order headers with item counts, newest first, optionally restricted
    /// to one user.
    async fn orders(&self, user_id: Option<i64>) -> StoreResult<Vec<OrderSummary>>;

    /// Overwrite an order's status (admin; free-form, no transition graph).
    async fn update_status(&self, id: Uuid, status: &str) -> StoreResult<()>;
}
