//! Order service entry point.

use std::sync::Arc;

use common::{Money, ProductId};
use order_api::config::Config;
use order_api::routes::orders::AppState;
use order_core::{DeliverySweeper, InMemoryOrderStore, OrderService, OrderStore, Product};
use signer::RequestSigner;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
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
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Seeds demo catalog entries; the catalog service proper is out of scope
/// for this deployment.
async fn seed_demo_products(store: &InMemoryOrderStore) {
    let products = [
        Product::new(ProductId::new("SKU-LAPTOP"), "Laptop", Money::from_cents(99999), 50),
        Product::new(ProductId::new("SKU-PHONE"), "Smartphone", Money::from_cents(49999), 100),
        Product::new(ProductId::new("SKU-HEADPHONES"), "Headphones", Money::from_cents(9999), 200),
        Product::new(ProductId::new("SKU-TABLET"), "Tablet", Money::from_cents(29999), 75),
        Product::new(ProductId::new("SKU-WATCH"), "Smartwatch", Money::from_cents(19999), 150),
    ];

    for product in products {
        store
            .insert_product(product)
            .await
            .expect("seeding the in-memory store cannot fail");
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Create the store and application state
    let store = InMemoryOrderStore::new();
    seed_demo_products(&store).await;

    let state = Arc::new(AppState {
        service: OrderService::new(store.clone()),
        signer: RequestSigner::new(config.secret_key.clone()),
    });

    // 4. Start the delivery sweeper
    let sweeper = DeliverySweeper::new(store, config.sweep_interval, config.delivery_dwell);
    tokio::spawn(sweeper.run());

    // 5. Build and start the server
    let app = order_api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting order service");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
