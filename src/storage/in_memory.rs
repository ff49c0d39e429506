//! In-memory implementations of the storefront services
//!
//! The default backend, used for testing and development. Uses RwLock for
//! thread-safe access. Order placement publishes the header, its items, and
//! the cart clear from a single critical section, so no partial order is
//! ever observable; promo consumption is a conditional increment under the
//! promo store's write lock.

use crate::core::cart::{CartItemView, CartLine};
use crate::core::error::{CartError, OrderError, PromoError, StorageError, StoreResult};
use crate::core::identity::CartIdentity;
use crate::core::order::{
    self, NewOrder, Order, OrderDetails, OrderItem, OrderReceipt, OrderSummary,
};
use crate::core::product::ProductCatalog;
use crate::core::promo::{NewPromoCode, PromoCode, PromoValidation};
use crate::core::service::{CartService, OrderService, PromoService};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

// =============================================================================
// Cart
// =============================================================================

/// In-memory cart store keyed by identity.
#[derive(Clone)]
pub struct InMemoryCartService {
    lines: Arc<RwLock<HashMap<CartIdentity, Vec<CartLine>>>>,
    catalog: Arc<dyn ProductCatalog>,
}

impl InMemoryCartService {
    /// Create a cart store joined against the given catalog.
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        Self {
            lines: Arc::new(RwLock::new(HashMap::new())),
            catalog,
        }
    }

    /// Synchronous clear, shared with order placement's critical section.
    pub(crate) fn clear_now(&self, identity: &CartIdentity) -> StoreResult<()> {
        let mut lines = self
            .lines
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        lines.remove(identity);
        Ok(())
    }
}

#[async_trait]
impl CartService for InMemoryCartService {
    async fn cart(&self, identity: &CartIdentity) -> StoreResult<Vec<CartItemView>> {
        let snapshot = {
            let lines = self.lines.read().map_err(|_| StorageError::LockPoisoned)?;
            lines.get(identity).cloned().unwrap_or_default()
        };

        // Lines whose product the catalog no longer carries are hidden.
        let mut views = Vec::with_capacity(snapshot.len());
        for line in &snapshot {
            if let Some(info) = self.catalog.product_info(line.product_id).await? {
                views.push(CartItemView::from_line(line, &info));
            }
        }
        Ok(views)
    }

    async fn add(
        &self,
        identity: &CartIdentity,
        product_id: i64,
        quantity: i64,
    ) -> StoreResult<CartLine> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity { quantity }.into());
        }

        // Single critical section: concurrent adds for the same
        // (identity, product) merge instead of duplicating the line.
        let mut lines = self
            .lines
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let cart = lines.entry(identity.clone()).or_default();

        if let Some(existing) = cart.iter_mut().find(|l| l.product_id == product_id) {
            existing.quantity += quantity;
            existing.touch();
            return Ok(existing.clone());
        }

        let line = CartLine::new(identity, product_id, quantity);
        cart.push(line.clone());
        Ok(line)
    }

    async fn set_quantity(
        &self,
        identity: &CartIdentity,
        line_id: Uuid,
        quantity: i64,
    ) -> StoreResult<()> {
        if quantity <= 0 {
            return self.remove_line(identity, line_id).await;
        }

        let mut lines = self
            .lines
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let line = lines
            .get_mut(identity)
            .and_then(|cart| cart.iter_mut().find(|l| l.id == line_id))
            .ok_or(CartError::LineNotFound { line_id })?;

        line.quantity = quantity;
        line.touch();
        Ok(())
    }

    async fn remove_line(&self, identity: &CartIdentity, line_id: Uuid) -> StoreResult<()> {
        let mut lines = self
            .lines
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        if let Some(cart) = lines.get_mut(identity) {
            cart.retain(|l| l.id != line_id);
        }
        Ok(())
    }

    async fn clear(&self, identity: &CartIdentity) -> StoreResult<()> {
        self.clear_now(identity)
    }
}

// =============================================================================
// Promo codes
// =============================================================================

/// In-memory promo code store keyed by code string.
#[derive(Clone, Default)]
pub struct InMemoryPromoService {
    codes: Arc<RwLock<HashMap<String, PromoCode>>>,
}

impl InMemoryPromoService {
    /// Create an empty promo store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Conditional increment, shared with order placement.
    ///
    /// Bumps `used_count` only while headroom remains, so a usage limit
    /// cannot be exceeded by concurrent checkouts.
    pub(crate) fn consume_now(&self, code: &str) -> StoreResult<()> {
        let mut codes = self
            .codes
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let promo = codes.get_mut(code).ok_or_else(|| PromoError::NotFound {
            code: code.to_string(),
        })?;

        if !promo.has_usage_headroom() {
            return Err(PromoError::Inapplicable {
                code: code.to_string(),
            }
            .into());
        }
        promo.used_count += 1;
        Ok(())
    }
}

#[async_trait]
impl PromoService for InMemoryPromoService {
    async fn validate(&self, code: &str, order_amount: Decimal) -> StoreResult<PromoValidation> {
        let codes = self.codes.read().map_err(|_| StorageError::LockPoisoned)?;
        let promo = codes.get(code).ok_or_else(|| PromoError::NotFound {
            code: code.to_string(),
        })?;

        if !promo.is_applicable(order_amount, Utc::now()) {
            return Err(PromoError::Inapplicable {
                code: code.to_string(),
            }
            .into());
        }

        Ok(PromoValidation {
            promo_code: promo.clone(),
            discount_amount: promo.discount_for(order_amount),
        })
    }

    async fn consume(&self, code: &str) -> StoreResult<()> {
        self.consume_now(code)
    }

    async fn create(&self, promo: NewPromoCode) -> StoreResult<PromoCode> {
        let promo = promo.into_promo_code();
        let mut codes = self
            .codes
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        codes.insert(promo.code.clone(), promo.clone());
        Ok(promo)
    }

    async fn list(&self) -> StoreResult<Vec<PromoCode>> {
        let codes = self.codes.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut all: Vec<PromoCode> = codes.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Default)]
struct OrderStore {
    orders: HashMap<Uuid, Order>,
    items: HashMap<Uuid, Vec<OrderItem>>,
    numbers: HashSet<String>,
}

/// In-memory order store.
///
/// Holds concrete handles to the cart and promo stores so that placement
/// can run its whole commit — promo consumption, header and item inserts,
/// user cart clear — without awaiting while locks are held.
#[derive(Clone)]
pub struct InMemoryOrderService {
    store: Arc<RwLock<OrderStore>>,
    carts: Arc<InMemoryCartService>,
    promos: Arc<InMemoryPromoService>,
    order_number_prefix: String,
}

impl InMemoryOrderService {
    /// Create an order store wired to the given cart and promo stores.
    pub fn new(
        carts: Arc<InMemoryCartService>,
        promos: Arc<InMemoryPromoService>,
        order_number_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store: Arc::new(RwLock::new(OrderStore::default())),
            carts,
            promos,
            order_number_prefix: order_number_prefix.into(),
        }
    }

    fn allocate_order_number(&self, taken: &HashSet<String>) -> StoreResult<String> {
        let now = Utc::now();
        for _ in 0..order::ORDER_NUMBER_ATTEMPTS {
            let candidate = order::generate_order_number(&self.order_number_prefix, now);
            if !taken.contains(&candidate) {
                return Ok(candidate);
            }
        }
        Err(OrderError::NumbersExhausted.into())
    }
}

#[async_trait]
impl OrderService for InMemoryOrderService {
    async fn place(&self, new_order: NewOrder) -> StoreResult<OrderReceipt> {
        // Re-derive the discount before anything mutates: a missing or
        // inapplicable code fails the checkout here, and a request with no
        // code must not claim a discount.
        let expected_discount = match &new_order.promo_code {
            Some(code) => {
                self.promos
                    .validate(code, new_order.subtotal)
                    .await?
                    .discount_amount
            }
            None => Decimal::ZERO,
        };
        order::verify_totals(&new_order, expected_discount)?;

        let mut store = self
            .store
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let order_number = self.allocate_order_number(&store.numbers)?;

        // Conditional consume runs before the order becomes visible; if the
        // limit was exhausted between validate and here, nothing persists.
        if let Some(code) = &new_order.promo_code {
            self.promos.consume_now(code)?;
        }

        let order_id = Uuid::new_v4();
        let header = Order {
            id: order_id,
            order_number: order_number.clone(),
            user_id: new_order.user_id,
            subtotal: new_order.subtotal,
            discount_amount: new_order.discount_amount,
            shipping_amount: new_order.shipping_amount,
            tax_amount: new_order.tax_amount,
            total_amount: new_order.total_amount,
            shipping_address: new_order.shipping_address,
            billing_address: new_order.billing_address,
            notes: new_order.notes,
            status: order::status::PENDING.to_string(),
            created_at: Utc::now(),
        };
        let items: Vec<OrderItem> = new_order
            .items
            .iter()
            .map(|item| OrderItem {
                id: Uuid::new_v4(),
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                total: item.total,
            })
            .collect();

        store.numbers.insert(order_number.clone());
        store.orders.insert(order_id, header);
        store.items.insert(order_id, items);
        drop(store);

        // Session carts stay: the order request carries no session identity.
        if let Some(user_id) = new_order.user_id {
            self.carts.clear_now(&CartIdentity::User(user_id))?;
        }

        tracing::info!(%order_id, %order_number, "order placed");
        Ok(OrderReceipt {
            order_id,
            order_number,
        })
    }

    async fn order(&self, id: Uuid) -> StoreResult<OrderDetails> {
        let store = self.store.read().map_err(|_| StorageError::LockPoisoned)?;
        let order = store
            .orders
            .get(&id)
            .cloned()
            .ok_or(OrderError::NotFound { id })?;
        let items = store.items.get(&id).cloned().unwrap_or_default();
        Ok(OrderDetails { order, items })
    }

    async fn orders(&self, user_id: Option<i64>) -> StoreResult<Vec<OrderSummary>> {
        let store = self.store.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut summaries: Vec<OrderSummary> = store
            .orders
            .values()
            .filter(|order| user_id.is_none() || order.user_id == user_id)
            .map(|order| OrderSummary {
                order: order.clone(),
                item_count: store.items.get(&order.id).map_or(0, |i| i.len() as i64),
            })
            .collect();
        summaries.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
        Ok(summaries)
    }

    async fn update_status(&self, id: Uuid, status: &str) -> StoreResult<()> {
        let mut store = self
            .store
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let order = store
            .orders
            .get_mut(&id)
            .ok_or(OrderError::NotFound { id })?;
        order.status = status.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StoreError;
    use crate::core::product::{InMemoryCatalog, ProductInfo};
    use crate::core::promo::DiscountType;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn catalog() -> Arc<InMemoryCatalog> {
        let catalog = InMemoryCatalog::new();
        catalog.insert(
            1,
            ProductInfo {
                name: "Raksha Devil Mask".to_string(),
                price: dec!(4500),
                original_price: None,
                image_url: None,
                category_name: Some("Masks".to_string()),
            },
        );
        catalog.insert(
            2,
            ProductInfo {
                name: "Handwoven Batik Sarong".to_string(),
                price: dec!(3200),
                original_price: None,
                image_url: None,
                category_name: Some("Textiles".to_string()),
            },
        );
        Arc::new(catalog)
    }

    fn cart_service() -> InMemoryCartService {
        InMemoryCartService::new(catalog())
    }

    fn promo(code: &str, limit: Option<i64>) -> NewPromoCode {
        NewPromoCode {
            code: code.to_string(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: dec!(10),
            minimum_order_amount: dec!(0),
            usage_limit: limit,
            valid_from: Utc::now() - Duration::days(1),
            valid_until: None,
        }
    }

    #[tokio::test]
    async fn test_add_merges_same_product() {
        let service = cart_service();
        let identity = CartIdentity::User(1);

        let first = service.add(&identity, 1, 2).await.unwrap();
        let merged = service.add(&identity, 1, 3).await.unwrap();

        assert_eq!(first.id, merged.id);
        assert_eq!(merged.quantity, 5);

        let cart = service.cart(&identity).await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity() {
        let service = cart_service();
        let identity = CartIdentity::User(1);

        let err = service.add(&identity, 1, 0).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Cart(CartError::InvalidQuantity { quantity: 0 })
        ));
        assert!(service.cart(&identity).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes_line() {
        let service = cart_service();
        let identity = CartIdentity::Session("s-1".to_string());

        let line = service.add(&identity, 1, 2).await.unwrap();
        service.set_quantity(&identity, line.id, 0).await.unwrap();

        assert!(service.cart(&identity).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_unknown_line_fails() {
        let service = cart_service();
        let identity = CartIdentity::User(1);
        service.add(&identity, 1, 2).await.unwrap();

        let err = service
            .set_quantity(&identity, Uuid::new_v4(), 4)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Cart(CartError::LineNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_set_quantity_foreign_identity_fails() {
        let service = cart_service();
        let owner = CartIdentity::User(1);
        let stranger = CartIdentity::User(2);
        let line = service.add(&owner, 1, 2).await.unwrap();

        let err = service.set_quantity(&stranger, line.id, 4).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Cart(CartError::LineNotFound { .. })
        ));
        // The owner's line is untouched.
        assert_eq!(service.cart(&owner).await.unwrap()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_remove_line_is_idempotent() {
        let service = cart_service();
        let identity = CartIdentity::User(1);
        let line = service.add(&identity, 1, 2).await.unwrap();

        service.remove_line(&identity, line.id).await.unwrap();
        // Second removal of the same (now absent) line is not an error.
        service.remove_line(&identity, line.id).await.unwrap();
        service.remove_line(&identity, Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_only_touches_one_identity() {
        let service = cart_service();
        let alice = CartIdentity::User(1);
        let bob = CartIdentity::User(2);
        service.add(&alice, 1, 1).await.unwrap();
        service.add(&bob, 2, 1).await.unwrap();

        service.clear(&alice).await.unwrap();

        assert!(service.cart(&alice).await.unwrap().is_empty());
        assert_eq!(service.cart(&bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cart_hides_delisted_products() {
        let catalog = catalog();
        let service = InMemoryCartService::new(catalog.clone());
        let identity = CartIdentity::User(1);
        service.add(&identity, 1, 1).await.unwrap();
        service.add(&identity, 2, 1).await.unwrap();

        catalog.remove(2);

        let cart = service.cart(&identity).await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].product_id, 1);
    }

    #[tokio::test]
    async fn test_consume_respects_usage_limit() {
        let service = InMemoryPromoService::new();
        service.create(promo("ONCE", Some(1))).await.unwrap();

        service.consume("ONCE").await.unwrap();
        let err = service.consume("ONCE").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Promo(PromoError::Inapplicable { .. })
        ));

        // used_count stopped at the limit.
        let codes = service.list().await.unwrap();
        assert_eq!(codes[0].used_count, 1);
    }

    #[tokio::test]
    async fn test_consume_unknown_code() {
        let service = InMemoryPromoService::new();
        let err = service.consume("GHOST").await.unwrap_err();
        assert!(matches!(err, StoreError::Promo(PromoError::NotFound { .. })));
    }

    fn order_service() -> (
        InMemoryOrderService,
        Arc<InMemoryCartService>,
        Arc<InMemoryPromoService>,
    ) {
        let carts = Arc::new(cart_service());
        let promos = Arc::new(InMemoryPromoService::new());
        let orders = InMemoryOrderService::new(carts.clone(), promos.clone(), "KP");
        (orders, carts, promos)
    }

    fn checkout_request(user_id: Option<i64>) -> NewOrder {
        NewOrder {
            user_id,
            items: vec![
                crate::core::order::NewOrderItem {
                    product_id: 1,
                    quantity: 2,
                    price: dec!(4500),
                    total: dec!(9000),
                },
                crate::core::order::NewOrderItem {
                    product_id: 2,
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

    #[tokio::test]
    async fn test_place_persists_header_and_items() {
        let (orders, _, _) = order_service();
        let receipt = orders.place(checkout_request(Some(1))).await.unwrap();

        assert!(receipt.order_number.starts_with("KP"));

        let details = orders.order(receipt.order_id).await.unwrap();
        assert_eq!(details.order.total_amount, dec!(12700));
        assert_eq!(details.order.status, "pending");
        assert_eq!(details.items.len(), 2);
        for item in &details.items {
            assert_eq!(item.total, item.price * Decimal::from(item.quantity));
        }
    }

    #[tokio::test]
    async fn test_place_clears_user_cart() {
        let (orders, carts, _) = order_service();
        let identity = CartIdentity::User(1);
        carts.add(&identity, 1, 2).await.unwrap();

        orders.place(checkout_request(Some(1))).await.unwrap();

        assert!(carts.cart(&identity).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_place_leaves_session_carts_alone() {
        let (orders, carts, _) = order_service();
        let session = CartIdentity::Session("s-1".to_string());
        carts.add(&session, 1, 2).await.unwrap();

        orders.place(checkout_request(None)).await.unwrap();

        assert_eq!(carts.cart(&session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_place_rejects_totals_mismatch() {
        let (orders, _, _) = order_service();
        let mut request = checkout_request(Some(1));
        request.total_amount = dec!(1);

        let err = orders.place(request).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Order(OrderError::TotalsMismatch { .. })
        ));
        assert!(orders.orders(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_place_consumes_promo_once() {
        let (orders, _, promos) = order_service();
        promos.create(promo("TEN", Some(5))).await.unwrap();

        let mut request = checkout_request(Some(1));
        request.promo_code = Some("TEN".to_string());
        request.discount_amount = dec!(1220);
        request.total_amount = dec!(11480);

        orders.place(request).await.unwrap();

        let codes = promos.list().await.unwrap();
        assert_eq!(codes[0].used_count, 1);
    }

    #[tokio::test]
    async fn test_orders_lists_newest_first_with_counts() {
        let (orders, _, _) = order_service();
        orders.place(checkout_request(Some(1))).await.unwrap();
        orders.place(checkout_request(Some(2))).await.unwrap();

        let all = orders.orders(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].order.created_at >= all[1].order.created_at);
        assert_eq!(all[0].item_count, 2);

        let mine = orders.orders(Some(2)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].order.user_id, Some(2));
    }

    #[tokio::test]
    async fn test_update_status() {
        let (orders, _, _) = order_service();
        let receipt = orders.place(checkout_request(None)).await.unwrap();

        orders
            .update_status(receipt.order_id, order::status::SHIPPED)
            .await
            .unwrap();
        let details = orders.order(receipt.order_id).await.unwrap();
        assert_eq!(details.order.status, "shipped");

        let err = orders
            .update_status(Uuid::new_v4(), "lost")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Order(OrderError::NotFound { .. })));
    }
}
