//! Application state shared across HTTP handlers

use crate::core::service::{CartService, OrderService, PromoService};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub carts: Arc<dyn CartService>,
    pub promos: Arc<dyn PromoService>,
    pub orders: Arc<dyn OrderService>,
}
