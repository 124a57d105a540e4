//! HTTP API server for the payment service.
//!
//! Exposes transaction creation and lookup, plus health and metrics, with
//! structured logging (tracing) and Prometheus metrics. The gateway outcome
//! strategy and the order notifier are injected at startup.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use payment_core::TransactionStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::payments::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: TransactionStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/payments", post(routes::payments::create::<S>))
        .route("/payments/{id}", get(routes::payments::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
