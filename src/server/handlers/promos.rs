//! HTTP handlers for the promo-code resource
//!
//! Validation keeps the storefront's coarse surface: whether a code is
//! missing, inactive, expired, below minimum, or exhausted, the caller
//! only ever sees "Invalid or expired promo code" with a `success` flag.

use axum::Json;
use axum::extract::{Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::core::error::{RequestError, StoreError, StoreResult};
use crate::core::promo::NewPromoCode;
use crate::server::state::AppState;

/// Query parameters for GET /promo-codes
///
/// The presence of `validate` switches from listing to validation.
#[derive(Debug, Deserialize)]
pub struct PromoQuery {
    pub validate: Option<String>,
    pub code: Option<String>,
    pub order_amount: Option<Decimal>,
}

/// GET /promo-codes — list all codes (admin)
/// GET /promo-codes?validate&code=…&order_amount=… — validate a code
pub async fn list_or_validate(
    State(state): State<AppState>,
    Query(query): Query<PromoQuery>,
) -> StoreResult<Json<Value>> {
    if query.validate.is_none() {
        let codes = state.promos.list().await?;
        return Ok(Json(json!(codes)));
    }

    let code = query.code.ok_or(RequestError::MissingParameter {
        parameter: "code".to_string(),
    })?;
    let order_amount = query.order_amount.ok_or(RequestError::MissingParameter {
        parameter: "order_amount".to_string(),
    })?;

    match state.promos.validate(&code, order_amount).await {
        Ok(validation) => Ok(Json(json!({
            "success": true,
            "promo_code": validation.promo_code,
            "discount_amount": validation.discount_amount,
            "message": "Promo code applied successfully",
        }))),
        Err(StoreError::Promo(_)) => Ok(Json(json!({
            "success": false,
            "message": "Invalid or expired promo code",
        }))),
        Err(other) => Err(other),
    }
}

/// POST /promo-codes — create a code (admin), or with `{"action": "use"}`
/// record one use of an existing code
pub async fn create_or_consume(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> StoreResult<Json<Value>> {
    if body.get("action").and_then(Value::as_str) == Some("use") {
        let code = body
            .get("code")
            .and_then(Value::as_str)
            .ok_or(RequestError::MissingParameter {
                parameter: "code".to_string(),
            })?;
        return match state.promos.consume(code).await {
            Ok(()) => Ok(Json(json!({ "success": true }))),
            Err(StoreError::Promo(_)) => Ok(Json(json!({
                "success": false,
                "message": "Invalid or expired promo code",
            }))),
            Err(other) => Err(other),
        };
    }

    let promo: NewPromoCode =
        serde_json::from_value(body).map_err(|e| RequestError::InvalidBody {
            message: e.to_string(),
        })?;
    let created = state.promos.create(promo).await?;
    Ok(Json(json!({ "success": true, "promo_code": created })))
}
