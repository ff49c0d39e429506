//! HTTP handlers for the storefront's REST resources

pub mod cart;
pub mod orders;
pub mod promos;

use crate::server::state::AppState;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

/// Build the storefront router:
///
/// - `GET/POST/PUT/DELETE /cart` — cart reads and mutations
/// - `GET/POST /promo-codes` — listing/validation and create/consume
/// - `GET/POST/PUT /orders`, `GET /orders/{order_id}` — checkout and
///   back-office order access
/// - `GET /health` — liveness probe
pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/cart",
            get(cart::get_cart)
                .post(cart::add_to_cart)
                .put(cart::update_cart_item)
                .delete(cart::delete_cart),
        )
        .route(
            "/promo-codes",
            get(promos::list_or_validate).post(promos::create_or_consume),
        )
        .route(
            "/orders",
            get(orders::list_orders)
                .post(orders::create_order)
                .put(orders::update_order_status),
        )
        .route("/orders/{order_id}", get(orders::get_order))
        .with_state(state)
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "storefront"
    }))
}
