//! Storage backend implementations
//!
//! The in-memory backend is the default; PostgreSQL lives behind the
//! `postgres` feature flag.

pub mod in_memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::{InMemoryCartService, InMemoryOrderService, InMemoryPromoService};

#[cfg(feature = "postgres")]
pub use postgres::{PostgresCartService, PostgresOrderService, PostgresPromoService};
