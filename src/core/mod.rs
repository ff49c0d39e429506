//! Core module containing the storefront's domain types and service traits

pub mod cart;
pub mod error;
pub mod identity;
pub mod money;
pub mod order;
pub mod product;
pub mod promo;
pub mod service;

pub use cart::{CartItemView, CartLine};
pub use error::{CartError, OrderError, PromoError, StoreError, StoreResult};
pub use identity::CartIdentity;
pub use order::{NewOrder, NewOrderItem, Order, OrderDetails, OrderItem, OrderReceipt, OrderSummary};
pub use product::{InMemoryCatalog, ProductCatalog, ProductInfo};
pub use promo::{DiscountType, NewPromoCode, PromoCode, PromoValidation};
pub use service::{CartService, OrderService, PromoService};
