//! Payment service entry point.

use std::sync::Arc;

use payment_api::config::Config;
use payment_api::routes::payments::AppState;
use payment_core::{
    HttpOrderNotifier, InMemoryTransactionStore, PaymentService, RandomGateway,
};
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

    // 3. Wire the service: store, gateway strategy, signed notifier
    let store = InMemoryTransactionStore::new();
    let gateway = Arc::new(RandomGateway::new(config.gateway_approval_rate));
    let notifier = HttpOrderNotifier::new(
        config.order_service_url.clone(),
        RequestSigner::new(config.secret_key.clone()),
        config.notify_timeout,
    )
    .expect("failed to build HTTP client");

    let service = PaymentService::with_gateway_timeout(
        store,
        gateway,
        Arc::new(notifier),
        config.gateway_timeout,
    );
    let state = Arc::new(AppState { service });

    // 4. Build and start the server
    let app = payment_api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, order_service = %config.order_service_url, "starting payment service");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
