//! Typed error handling for the storefront core
//!
//! Every fallible operation in the crate returns [`StoreResult`], so callers
//! and tests can match on the precise cause. At the HTTP boundary the
//! granularity is deliberately coarser: cart mutations, promo validation and
//! checkout answer with a `success` flag plus a human-readable message, and
//! only request/validation errors surface as structured error responses.
//!
//! # Error Categories
//!
//! - [`CartError`]: identity resolution and cart-line operations
//! - [`PromoError`]: promo code lookup and applicability
//! - [`OrderError`]: order lookup and totals verification
//! - [`StorageError`]: backend failures (connectivity, transactions, locks)
//! - [`RequestError`]: malformed HTTP input

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type for the storefront core
///
/// Each variant wraps a more specific error type for that category.
#[derive(Debug)]
pub enum StoreError {
    /// Cart identity and cart-line errors
    Cart(CartError),

    /// Promo code errors
    Promo(PromoError),

    /// Order placement and lookup errors
    Order(OrderError),

    /// Storage backend errors
    Storage(StorageError),

    /// HTTP request errors
    Request(RequestError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Cart(e) => write!(f, "{}", e),
            StoreError::Promo(e) => write!(f, "{}", e),
            StoreError::Order(e) => write!(f, "{}", e),
            StoreError::Storage(e) => write!(f, "{}", e),
            StoreError::Request(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Cart(e) => Some(e),
            StoreError::Promo(e) => Some(e),
            StoreError::Order(e) => Some(e),
            StoreError::Storage(e) => Some(e),
            StoreError::Request(e) => Some(e),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl StoreError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Cart(e) => e.status_code(),
            StoreError::Promo(e) => e.status_code(),
            StoreError::Order(e) => e.status_code(),
            StoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StoreError::Request(e) => e.status_code(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Cart(e) => e.error_code(),
            StoreError::Promo(e) => e.error_code(),
            StoreError::Order(e) => e.error_code(),
            StoreError::Storage(_) => "STORAGE_ERROR",
            StoreError::Request(e) => e.error_code(),
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            StoreError::Cart(CartError::InvalidQuantity { quantity }) => {
                Some(serde_json::json!({ "quantity": quantity }))
            }
            StoreError::Cart(CartError::LineNotFound { line_id }) => {
                Some(serde_json::json!({ "line_id": line_id.to_string() }))
            }
            StoreError::Order(OrderError::TotalsMismatch {
                field,
                expected,
                supplied,
            }) => Some(serde_json::json!({
                "field": field,
                "expected": expected.to_string(),
                "supplied": supplied.to_string(),
            })),
            _ => None,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Cart Errors
// =============================================================================

/// Errors related to cart identity and cart-line operations
#[derive(Debug)]
pub enum CartError {
    /// Neither a user id nor a session id was supplied
    InvalidIdentity,

    /// Quantity on add was zero or negative
    InvalidQuantity { quantity: i64 },

    /// Referenced cart line does not exist for this identity
    LineNotFound { line_id: Uuid },
}

impl fmt::Display for CartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartError::InvalidIdentity => {
                write!(f, "Either user_id or session_id is required")
            }
            CartError::InvalidQuantity { quantity } => {
                write!(f, "Quantity must be a positive integer (got {})", quantity)
            }
            CartError::LineNotFound { line_id } => {
                write!(f, "Cart line '{}' not found", line_id)
            }
        }
    }
}

impl std::error::Error for CartError {}

impl CartError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CartError::InvalidIdentity => StatusCode::BAD_REQUEST,
            CartError::InvalidQuantity { .. } => StatusCode::BAD_REQUEST,
            CartError::LineNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CartError::InvalidIdentity => "INVALID_IDENTITY",
            CartError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            CartError::LineNotFound { .. } => "CART_LINE_NOT_FOUND",
        }
    }
}

impl From<CartError> for StoreError {
    fn from(err: CartError) -> Self {
        StoreError::Cart(err)
    }
}

// =============================================================================
// Promo Errors
// =============================================================================

/// Errors related to promo codes
///
/// The HTTP layer collapses both variants into the same "Invalid or expired
/// promo code" message; the split exists for internal callers and tests.
#[derive(Debug)]
pub enum PromoError {
    /// No promo code with this code exists
    NotFound { code: String },

    /// The code exists but fails an applicability predicate
    /// (inactive, outside its validity window, below the minimum order
    /// amount, or usage limit reached)
    Inapplicable { code: String },
}

impl fmt::Display for PromoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromoError::NotFound { code } => {
                write!(f, "Promo code '{}' not found", code)
            }
            PromoError::Inapplicable { code } => {
                write!(f, "Promo code '{}' is not applicable to this order", code)
            }
        }
    }
}

impl std::error::Error for PromoError {}

impl PromoError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PromoError::NotFound { .. } => StatusCode::NOT_FOUND,
            PromoError::Inapplicable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PromoError::NotFound { .. } => "PROMO_NOT_FOUND",
            PromoError::Inapplicable { .. } => "PROMO_INAPPLICABLE",
        }
    }
}

impl From<PromoError> for StoreError {
    fn from(err: PromoError) -> Self {
        StoreError::Promo(err)
    }
}

// =============================================================================
// Order Errors
// =============================================================================

/// Errors related to order placement and lookup
#[derive(Debug)]
pub enum OrderError {
    /// Order was not found
    NotFound { id: Uuid },

    /// A supplied monetary field diverges from the server-side computation
    /// beyond the rounding tolerance
    TotalsMismatch {
        field: &'static str,
        expected: Decimal,
        supplied: Decimal,
    },

    /// Could not generate a unique order number within the retry budget
    NumbersExhausted,
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderError::NotFound { id } => {
                write!(f, "Order '{}' not found", id)
            }
            OrderError::TotalsMismatch {
                field,
                expected,
                supplied,
            } => {
                write!(
                    f,
                    "Order {} mismatch: expected {}, got {}",
                    field, expected, supplied
                )
            }
            OrderError::NumbersExhausted => {
                write!(f, "Could not allocate a unique order number")
            }
        }
    }
}

impl std::error::Error for OrderError {}

impl OrderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::NotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::TotalsMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            OrderError::NumbersExhausted => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            OrderError::NotFound { .. } => "ORDER_NOT_FOUND",
            OrderError::TotalsMismatch { .. } => "TOTALS_MISMATCH",
            OrderError::NumbersExhausted => "ORDER_NUMBERS_EXHAUSTED",
        }
    }
}

impl From<OrderError> for StoreError {
    fn from(err: OrderError) -> Self {
        StoreError::Order(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Query or statement execution error
    Backend { backend: String, message: String },

    /// A transaction could not be committed and was rolled back
    Transaction { message: String },

    /// An in-memory lock was poisoned by a panicking writer
    LockPoisoned,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Backend { backend, message } => {
                write!(f, "{} error: {}", backend, message)
            }
            StorageError::Transaction { message } => {
                write!(f, "Transaction rolled back: {}", message)
            }
            StorageError::LockPoisoned => {
                write!(f, "Storage lock poisoned")
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        StoreError::Storage(err)
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Storage(StorageError::Backend {
            backend: "PostgreSQL".to_string(),
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Invalid request body
    InvalidBody { message: String },

    /// Missing required query parameter
    MissingParameter { parameter: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
            RequestError::MissingParameter { parameter } => {
                write!(f, "Missing required parameter: {}", parameter)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::MissingParameter { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::MissingParameter { .. } => "MISSING_PARAMETER",
        }
    }
}

impl From<RequestError> for StoreError {
    fn from(err: RequestError) -> Self {
        StoreError::Request(err)
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for storefront operations
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Tests
// =============================================================================
