//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresCartService`, `PostgresPromoService`, and
//! `PostgresOrderService` backed by a PostgreSQL database via
//! `sqlx::PgPool`. The schema lives in `migrations/`.
//!
//! The cart merge is a single `INSERT ... ON CONFLICT ... DO UPDATE`
//! upsert keyed by (owner, product), promo consumption is a conditional
//! `UPDATE ... WHERE used_count < usage_limit` checked by rows-affected,
//! and order placement is one transaction: header insert, item inserts,
//! promo consume, user cart clear, commit. Any failure rolls the whole
//! attempt back.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! storefront = { version = "0.1", features = ["postgres"] }
//! ```

use crate::core::cart::{CartItemView, CartLine, CartLineOwner};
use crate::core::error::{CartError, OrderError, PromoError, StoreError, StoreResult};
use crate::core::identity::CartIdentity;
use crate::core::order::{
    self, NewOrder, Order, OrderDetails, OrderItem, OrderReceipt, OrderSummary,
};
use crate::core::promo::{DiscountType, NewPromoCode, PromoCode, PromoValidation};
use crate::core::service::{CartService, OrderService, PromoService};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}

// =============================================================================
// Cart
// =============================================================================

/// Cart storage backed by PostgreSQL.
///
/// The catalog join happens in SQL against the `products`,
/// `product_images`, and `categories` tables owned by the catalog
/// component; cart reads never see products that were delisted.
#[derive(Clone, Debug)]
pub struct PostgresCartService {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: Uuid,
    user_id: Option<i64>,
    session_id: Option<String>,
    product_id: i64,
    quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        CartLine {
            id: row.id,
            identity: CartLineOwner {
                user_id: row.user_id,
                session_id: row.session_id,
            },
            product_id: row.product_id,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartItemViewRow {
    id: Uuid,
    product_id: i64,
    quantity: i64,
    name: String,
    price: Decimal,
    original_price: Option<Decimal>,
    image_url: Option<String>,
    category_name: Option<String>,
}

impl PostgresCartService {
    /// Create a new `PostgresCartService` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartService for PostgresCartService {
    async fn cart(&self, identity: &CartIdentity) -> StoreResult<Vec<CartItemView>> {
        let rows: Vec<CartItemViewRow> = sqlx::query_as(
            r#"
            SELECT c.id, c.product_id, c.quantity,
                   p.name, p.price, p.original_price,
                   pi.image_url, cat.name AS category_name
            FROM shopping_cart c
            JOIN products p ON c.product_id = p.id
            LEFT JOIN product_images pi ON p.id = pi.product_id AND pi.is_primary
            LEFT JOIN categories cat ON p.category_id = cat.id
            WHERE c.owner_key = $1
            ORDER BY c.created_at
            "#,
        )
        .bind(identity.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CartItemView {
                id: row.id,
                product_id: row.product_id,
                quantity: row.quantity,
                name: row.name,
                price: row.price,
                original_price: row.original_price,
                image_url: row.image_url,
                category_name: row.category_name,
            })
            .collect())
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

        // One atomic upsert keyed by (owner, product): concurrent adds
        // merge into the existing line instead of duplicating it.
        let row: CartLineRow = sqlx::query_as(
            r#"
            INSERT INTO shopping_cart
                (id, user_id, session_id, owner_key, product_id, quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, now(), now())
            ON CONFLICT (owner_key, product_id)
            DO UPDATE SET quantity = shopping_cart.quantity + EXCLUDED.quantity,
                          updated_at = now()
            RETURNING id, user_id, session_id, product_id, quantity, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(identity.user_id())
        .bind(identity.session_id())
        .bind(identity.to_string())
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
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

        let result = sqlx::query(
            "UPDATE shopping_cart SET quantity = $3, updated_at = now()
             WHERE id = $2 AND owner_key = $1",
        )
        .bind(identity.to_string())
        .bind(line_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CartError::LineNotFound { line_id }.into());
        }
        Ok(())
    }

    async fn remove_line(&self, identity: &CartIdentity, line_id: Uuid) -> StoreResult<()> {
        // Idempotent: deleting an absent line affects zero rows and is fine.
        sqlx::query("DELETE FROM shopping_cart WHERE id = $2 AND owner_key = $1")
            .bind(identity.to_string())
            .bind(line_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self, identity: &CartIdentity) -> StoreResult<()> {
        sqlx::query("DELETE FROM shopping_cart WHERE owner_key = $1")
            .bind(identity.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Promo codes
// =============================================================================

/// Promo code storage backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PostgresPromoService {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct PromoRow {
    code: String,
    description: Option<String>,
    discount_type: String,
    discount_value: Decimal,
    minimum_order_amount: Decimal,
    usage_limit: Option<i64>,
    used_count: i64,
    valid_from: DateTime<Utc>,
    valid_until: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<PromoRow> for PromoCode {
    fn from(row: PromoRow) -> Self {
        PromoCode {
            code: row.code,
            description: row.description,
            // Anything but "percentage" is a fixed amount, as in the
            // storefront's historical data.
            discount_type: if row.discount_type == "percentage" {
                DiscountType::Percentage
            } else {
                DiscountType::FixedAmount
            },
            discount_value: row.discount_value,
            minimum_order_amount: row.minimum_order_amount,
            usage_limit: row.usage_limit,
            used_count: row.used_count,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

fn discount_type_column(discount_type: DiscountType) -> &'static str {
    match discount_type {
        DiscountType::Percentage => "percentage",
        DiscountType::FixedAmount => "fixed_amount",
    }
}

impl PostgresPromoService {
    /// Create a new `PostgresPromoService` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromoService for PostgresPromoService {
    async fn validate(&self, code: &str, order_amount: Decimal) -> StoreResult<PromoValidation> {
        let row: Option<PromoRow> = sqlx::query_as("SELECT * FROM promo_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        let promo: PromoCode = row
            .ok_or_else(|| PromoError::NotFound {
                code: code.to_string(),
            })?
            .into();

        if !promo.is_applicable(order_amount, Utc::now()) {
            return Err(PromoError::Inapplicable {
                code: code.to_string(),
            }
            .into());
        }

        let discount_amount = promo.discount_for(order_amount);
        Ok(PromoValidation {
            promo_code: promo,
            discount_amount,
        })
    }

    async fn consume(&self, code: &str) -> StoreResult<()> {
        match consume_in(&self.pool, code).await {
            Err(StoreError::Promo(PromoError::Inapplicable { .. })) => {
                // Zero rows either means the limit is exhausted or the code
                // never existed; tell the two apart for callers.
                let exists: Option<i32> =
                    sqlx::query_scalar("SELECT 1 FROM promo_codes WHERE code = $1")
                        .bind(code)
                        .fetch_optional(&self.pool)
                        .await?;
                if exists.is_none() {
                    return Err(PromoError::NotFound {
                        code: code.to_string(),
                    }
                    .into());
                }
                Err(PromoError::Inapplicable {
                    code: code.to_string(),
                }
                .into())
            }
            other => other,
        }
    }

    async fn create(&self, promo: NewPromoCode) -> StoreResult<PromoCode> {
        let promo = promo.into_promo_code();
        sqlx::query(
            r#"
            INSERT INTO promo_codes
                (code, description, discount_type, discount_value, minimum_order_amount,
                 usage_limit, used_count, valid_from, valid_until, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&promo.code)
        .bind(&promo.description)
        .bind(discount_type_column(promo.discount_type))
        .bind(promo.discount_value)
        .bind(promo.minimum_order_amount)
        .bind(promo.usage_limit)
        .bind(promo.used_count)
        .bind(promo.valid_from)
        .bind(promo.valid_until)
        .bind(promo.is_active)
        .bind(promo.created_at)
        .execute(&self.pool)
        .await?;
        Ok(promo)
    }

    async fn list(&self) -> StoreResult<Vec<PromoCode>> {
        let rows: Vec<PromoRow> =
            sqlx::query_as("SELECT * FROM promo_codes ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(PromoCode::from).collect())
    }
}

/// Conditional usage increment, runnable on the pool or inside a
/// transaction. Zero rows affected means the code is unknown or its limit
/// is exhausted; the caller distinguishes via a follow-up existence check.
async fn consume_in<'e, E>(executor: E, code: &str) -> StoreResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    let result = sqlx::query(
        "UPDATE promo_codes SET used_count = used_count + 1
         WHERE code = $1 AND (usage_limit IS NULL OR used_count < usage_limit)",
    )
    .bind(code)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(PromoError::Inapplicable {
            code: code.to_string(),
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// Orders
// =============================================================================

/// Order storage backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PostgresOrderService {
    pool: PgPool,
    order_number_prefix: String,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    user_id: Option<i64>,
    subtotal: Decimal,
    discount_amount: Decimal,
    shipping_amount: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    shipping_address: String,
    billing_address: String,
    notes: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            subtotal: row.subtotal,
            discount_amount: row.discount_amount,
            shipping_amount: row.shipping_amount,
            tax_amount: row.tax_amount,
            total_amount: row.total_amount,
            shipping_address: row.shipping_address,
            billing_address: row.billing_address,
            notes: row.notes,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: i64,
    quantity: i64,
    price: Decimal,
    total: Decimal,
}

impl PostgresOrderService {
    /// Create a new `PostgresOrderService` with the given connection pool.
    pub fn new(pool: PgPool, order_number_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            order_number_prefix: order_number_prefix.into(),
        }
    }

    /// One placement attempt under a freshly drawn order number.
    ///
    /// Returns `Ok(None)` when the number collided with an existing order
    /// (the UNIQUE constraint fired); the caller redraws. Everything runs
    /// in one transaction that rolls back on any error.
    async fn try_place(
        &self,
        new_order: &NewOrder,
        order_number: &str,
    ) -> StoreResult<Option<OrderReceipt>> {
        let mut tx = self.pool.begin().await?;

        let insert = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO orders
                (id, order_number, user_id, subtotal, discount_amount, shipping_amount,
                 tax_amount, total_amount, shipping_address, billing_address, notes,
                 status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, now())
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_number)
        .bind(new_order.user_id)
        .bind(new_order.subtotal)
        .bind(new_order.discount_amount)
        .bind(new_order.shipping_amount)
        .bind(new_order.tax_amount)
        .bind(new_order.total_amount)
        .bind(&new_order.shipping_address)
        .bind(&new_order.billing_address)
        .bind(&new_order.notes)
        .bind(order::status::PENDING)
        .fetch_one(&mut *tx)
        .await;

        let order_id = match insert {
            Ok(id) => id,
            Err(ref e) if is_unique_violation(e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // Items go in caller order; no dedup across lines.
        for item in &new_order.items {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, quantity, price, total)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(Uuid::new_v4())
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .bind(item.total)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(code) = &new_order.promo_code {
            consume_in(&mut *tx, code).await?;
        }

        if let Some(user_id) = new_order.user_id {
            sqlx::query("DELETE FROM shopping_cart WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(OrderReceipt {
            order_id,
            order_number: order_number.to_string(),
        }))
    }
}

#[async_trait]
impl OrderService for PostgresOrderService {
    async fn place(&self, new_order: NewOrder) -> StoreResult<OrderReceipt> {
        let expected_discount = match &new_order.promo_code {
            Some(code) => {
                PostgresPromoService::new(self.pool.clone())
                    .validate(code, new_order.subtotal)
                    .await?
                    .discount_amount
            }
            None => Decimal::ZERO,
        };
        order::verify_totals(&new_order, expected_discount)?;

        for _ in 0..order::ORDER_NUMBER_ATTEMPTS {
            let order_number =
                order::generate_order_number(&self.order_number_prefix, Utc::now());
            if let Some(receipt) = self.try_place(&new_order, &order_number).await? {
                tracing::info!(order_id = %receipt.order_id,
                               order_number = %receipt.order_number,
                               "order placed");
                return Ok(receipt);
            }
            tracing::warn!(%order_number, "order number collision, redrawing");
        }
        Err(OrderError::NumbersExhausted.into())
    }

    async fn order(&self, id: Uuid) -> StoreResult<OrderDetails> {
        let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let order: Order = row.ok_or(OrderError::NotFound { id })?.into();

        let items: Vec<OrderItemRow> =
            sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

        Ok(OrderDetails {
            order,
            items: items
                .into_iter()
                .map(|row| OrderItem {
                    id: row.id,
                    order_id: row.order_id,
                    product_id: row.product_id,
                    quantity: row.quantity,
                    price: row.price,
                    total: row.total,
                })
                .collect(),
        })
    }

    async fn orders(&self, user_id: Option<i64>) -> StoreResult<Vec<OrderSummary>> {
        #[derive(sqlx::FromRow)]
        struct SummaryRow {
            #[sqlx(flatten)]
            order: OrderRow,
            item_count: i64,
        }

        let base = r#"
            SELECT o.*, COUNT(oi.id) AS item_count
            FROM orders o
            LEFT JOIN order_items oi ON o.id = oi.order_id
        "#;
        let rows: Vec<SummaryRow> = match user_id {
            Some(uid) => {
                let query = format!(
                    "{base} WHERE o.user_id = $1 GROUP BY o.id ORDER BY o.created_at DESC"
                );
                sqlx::query_as(&query).bind(uid).fetch_all(&self.pool).await?
            }
            None => {
                let query = format!("{base} GROUP BY o.id ORDER BY o.created_at DESC");
                sqlx::query_as(&query).fetch_all(&self.pool).await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|row| OrderSummary {
                order: row.order.into(),
                item_count: row.item_count,
            })
            .collect())
    }

    async fn update_status(&self, id: Uuid, status: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound { id }.into());
        }
        Ok(())
    }
}
