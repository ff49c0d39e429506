//! HTTP handlers for the orders resource
//!
//! Checkout mirrors the storefront's surface: HTTP 200 with a `success`
//! flag, an `order_id`/`order_number` pair on success, and a single
//! human-readable message on failure — the caller is never told whether
//! totals, the promo code, or the store itself was at fault.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::core::error::StoreResult;
use crate::core::order::{NewOrder, OrderDetails, OrderSummary};
use crate::server::state::AppState;

/// Query parameters for GET /orders
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub user_id: Option<i64>,
}

/// Request body for PUT /orders
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub id: Uuid,
    pub status: String,
}

/// POST /orders — place an order
pub async fn create_order(
    State(state): State<AppState>,
    Json(order): Json<NewOrder>,
) -> Json<Value> {
    match state.orders.place(order).await {
        Ok(receipt) => Json(json!({
            "success": true,
            "order_id": receipt.order_id,
            "order_number": receipt.order_number,
        })),
        Err(err) => {
            tracing::warn!(error = %err, "checkout failed");
            Json(json!({
                "success": false,
                "message": format!("Failed to create order: {}", err),
            }))
        }
    }
}

/// GET /orders[?user_id=…] — order headers with item counts, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> StoreResult<Json<Vec<OrderSummary>>> {
    let orders = state.orders.orders(query.user_id).await?;
    Ok(Json(orders))
}

/// GET /orders/{order_id} — one order with its items
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> StoreResult<Json<OrderDetails>> {
    let details = state.orders.order(order_id).await?;
    Ok(Json(details))
}

/// PUT /orders — overwrite an order's status (admin)
pub async fn update_order_status(
    State(state): State<AppState>,
    Json(request): Json<UpdateStatusRequest>,
) -> StoreResult<Json<Value>> {
    state
        .orders
        .update_status(request.id, &request.status)
        .await?;
    Ok(Json(json!({ "success": true })))
}
