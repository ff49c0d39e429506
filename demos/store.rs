//! Run an in-memory storefront with a few seeded products.
//!
//! ```sh
//! cargo run --example store
//! curl 'localhost:3000/cart?session_id=demo'
//! ```

use rust_decimal::Decimal;
use std::sync::Arc;
use storefront::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=debug,tower_http=debug".into()),
        )
        .init();

    let catalog = Arc::new(InMemoryCatalog::new());
    catalog.insert(
        1,
        ProductInfo {
            name: "Raksha Devil Mask".to_string(),
            price: Decimal::from(4500),
            original_price: Some(Decimal::from(5200)),
            image_url: Some("/images/raksha-devil.jpg".to_string()),
            category_name: Some("Masks".to_string()),
        },
    );
    catalog.insert(
        2,
        ProductInfo {
            name: "Handwoven Batik Sarong".to_string(),
            price: Decimal::from(3200),
            original_price: None,
            image_url: Some("/images/batik-sarong.jpg".to_string()),
            category_name: Some("Textiles".to_string()),
        },
    );
    catalog.insert(
        3,
        ProductInfo {
            name: "Silver Temple Jewelry".to_string(),
            price: Decimal::from(7800),
            original_price: None,
            image_url: Some("/images/temple-jewelry.jpg".to_string()),
            category_name: Some("Jewelry".to_string()),
        },
    );

    ServerBuilder::in_memory(catalog)
        .with_config(StoreConfig::default().with_env_overrides())
        .serve()
        .await
}
