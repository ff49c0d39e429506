//! ServerBuilder for fluent API to build the storefront HTTP server

use crate::config::StoreConfig;
use crate::core::product::ProductCatalog;
use crate::core::service::{CartService, OrderService, PromoService};
use crate::server::handlers::build_routes;
use crate::server::state::AppState;
use crate::storage::{InMemoryCartService, InMemoryOrderService, InMemoryPromoService};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the storefront HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::in_memory(catalog).build()?;
/// ```
pub struct ServerBuilder {
    config: StoreConfig,
    carts: Option<Arc<dyn CartService>>,
    promos: Option<Arc<dyn PromoService>>,
    orders: Option<Arc<dyn OrderService>>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with default configuration
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            carts: None,
            promos: None,
            orders: None,
        }
    }

    /// Wire up the in-memory backend against the given catalog
    ///
    /// Creates the cart, promo, and order stores and connects order
    /// placement to the cart clear and promo consume paths.
    pub fn in_memory(catalog: Arc<dyn ProductCatalog>) -> Self {
        let config = StoreConfig::default();
        let carts = Arc::new(InMemoryCartService::new(catalog));
        let promos = Arc::new(InMemoryPromoService::new());
        let orders = Arc::new(InMemoryOrderService::new(
            carts.clone(),
            promos.clone(),
            config.order_number_prefix.clone(),
        ));
        Self {
            config,
            carts: Some(carts),
            promos: Some(promos),
            orders: Some(orders),
        }
    }

    /// Set the configuration
    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the cart service
    pub fn with_cart_service(mut self, service: impl CartService + 'static) -> Self {
        self.carts = Some(Arc::new(service));
        self
    }

    /// Set the promo service
    pub fn with_promo_service(mut self, service: impl PromoService + 'static) -> Self {
        self.promos = Some(Arc::new(service));
        self
    }

    /// Set the order service
    pub fn with_order_service(mut self, service: impl OrderService + 'static) -> Self {
        self.orders = Some(Arc::new(service));
        self
    }

    /// Build the final router
    ///
    /// Adds request tracing and the permissive CORS the storefront's
    /// endpoints have always sent.
    pub fn build(self) -> Result<Router> {
        let state = AppState {
            carts: self
                .carts
                .ok_or_else(|| anyhow::anyhow!("CartService is required"))?,
            promos: self
                .promos
                .ok_or_else(|| anyhow::anyhow!("PromoService is required"))?,
            orders: self
                .orders
                .ok_or_else(|| anyhow::anyhow!("OrderService is required"))?,
        };

        Ok(build_routes(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds to the configured address, serves requests, and handles
    /// SIGTERM and SIGINT (Ctrl+C) for graceful shutdown.
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Storefront listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
