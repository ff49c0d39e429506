//! HTTP handlers for the cart resource
//!
//! The cart is keyed by `user_id` or `session_id`, carried as query
//! parameters on reads/deletes and body fields on writes. Mutations answer
//! with the storefront's `success` envelope.

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::cart::{CartItemView, CartLine};
use crate::core::error::StoreResult;
use crate::core::identity::CartIdentity;
use crate::server::state::AppState;

/// Identity fields accepted as query parameters, plus the optional line id
/// that switches DELETE from "clear cart" to "remove one line".
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub id: Option<Uuid>,
}

/// Request body for adding a product to the cart
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub product_id: i64,
    pub quantity: i64,
}

/// Request body for overwriting a line's quantity
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub id: Uuid,
    pub quantity: i64,
}

/// Mutation acknowledgement envelope
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Add acknowledgement with the resulting (possibly merged) line
#[derive(Debug, Serialize)]
pub struct AddToCartResponse {
    pub success: bool,
    pub line: CartLine,
}

/// GET /cart?user_id=… | ?session_id=…
pub async fn get_cart(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> StoreResult<Json<Vec<CartItemView>>> {
    let identity = CartIdentity::resolve(query.user_id, query.session_id)?;
    let items = state.carts.cart(&identity).await?;
    Ok(Json(items))
}

/// POST /cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(request): Json<AddToCartRequest>,
) -> StoreResult<Json<AddToCartResponse>> {
    let identity = CartIdentity::resolve(request.user_id, request.session_id)?;
    let line = state
        .carts
        .add(&identity, request.product_id, request.quantity)
        .await?;
    Ok(Json(AddToCartResponse {
        success: true,
        line,
    }))
}

/// PUT /cart — a quantity of zero or less removes the line
pub async fn update_cart_item(
    State(state): State<AppState>,
    Json(request): Json<UpdateCartRequest>,
) -> StoreResult<Json<SuccessResponse>> {
    let identity = CartIdentity::resolve(request.user_id, request.session_id)?;
    state
        .carts
        .set_quantity(&identity, request.id, request.quantity)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /cart?id=… removes one line; without `id` the whole cart is
/// cleared
pub async fn delete_cart(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> StoreResult<Json<SuccessResponse>> {
    let identity = CartIdentity::resolve(query.user_id, query.session_id)?;
    match query.id {
        Some(line_id) => state.carts.remove_line(&identity, line_id).await?,
        None => state.carts.clear(&identity).await?,
    }
    Ok(Json(SuccessResponse { success: true }))
}
