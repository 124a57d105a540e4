//! Integration tests for the payment service API.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TransactionId;
use metrics_exporter_prometheus::PrometheusHandle;
use payment_api::routes::payments::AppState;
use payment_core::{
    FixedGateway, InMemoryTransactionStore, PaymentService, RecordingNotifier,
};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup(gateway: FixedGateway) -> (axum::Router, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let service = PaymentService::new(
        InMemoryTransactionStore::new(),
        Arc::new(gateway),
        Arc::new(notifier.clone()),
    );
    let state = Arc::new(AppState { service });
    let app = payment_api::create_app(state, get_metrics_handle());
    (app, notifier)
}

fn create_payment_request(order_id: &str, amount: i64) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/payments")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&serde_json::json!({
                "order_id": order_id,
                "amount": amount
            }))
            .unwrap(),
        ))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_check() {
    let (app, _) = setup(FixedGateway::approving());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn approved_payment_completes_and_notifies() {
    let (app, notifier) = setup(FixedGateway::approving());

    let response = app
        .oneshot(create_payment_request("order-1", 2000))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let transaction = body_json(response).await;
    assert_eq!(transaction["status"], "Completed");
    assert_eq!(transaction["order_id"], "order-1");
    assert_eq!(transaction["amount"], 2000);

    let sent = notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].order_id, "order-1");
}

#[tokio::test]
async fn declined_payment_fails_and_notifies() {
    let (app, notifier) = setup(FixedGateway::declining());

    let response = app
        .oneshot(create_payment_request("order-1", 2000))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let transaction = body_json(response).await;
    assert_eq!(transaction["status"], "Failed");

    let sent = notifier.sent().await;
    assert_eq!(sent.len(), 1);
}

#[tokio::test]
async fn unreachable_order_service_does_not_fail_the_payment() {
    let (app, notifier) = setup(FixedGateway::approving());
    notifier.set_fail(true);

    let response = app
        .oneshot(create_payment_request("order-1", 2000))
        .await
        .unwrap();

    // The client still sees the resolved transaction.
    assert_eq!(response.status(), StatusCode::CREATED);
    let transaction = body_json(response).await;
    assert_eq!(transaction["status"], "Completed");
}

#[tokio::test]
async fn non_positive_amount_is_rejected() {
    let (app, _) = setup(FixedGateway::approving());

    let response = app
        .oneshot(create_payment_request("order-1", 0))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_order_id_is_rejected() {
    let (app, _) = setup(FixedGateway::approving());

    let response = app.oneshot(create_payment_request("", 100)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_transaction_roundtrip() {
    let (app, _) = setup(FixedGateway::approving());

    let created = app
        .clone()
        .oneshot(create_payment_request("order-1", 2000))
        .await
        .unwrap();
    let transaction = body_json(created).await;
    let id = transaction["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/payments/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stored = body_json(response).await;
    assert_eq!(stored["id"], *id);
    assert_eq!(stored["status"], "Completed");

    // Unknown but well-formed id
    let missing = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/payments/{}", TransactionId::new()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    // Malformed id
    let bad = app
        .oneshot(
            Request::builder()
                .uri("/payments/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}
