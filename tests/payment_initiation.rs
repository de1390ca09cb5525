mod common;

use axum::http::StatusCode;
use chrono::Duration;
use rust_decimal_macros::dec;
use squeeze_payments::domain::order::OrderStatus;
use squeeze_payments::domain::payment::StkPushRequest;
use squeeze_payments::domain::ports::OrderStore;
use squeeze_payments::gateways::mock::MockGateway;
use squeeze_payments::repo::in_memory::InMemoryOrderStore;
use squeeze_payments::service::payment_service::{InitiationFailure, PaymentService};
use std::sync::Arc;
use uuid::Uuid;

fn service(store: &InMemoryOrderStore, gateway: Arc<MockGateway>) -> PaymentService {
    PaymentService {
        orders: Arc::new(store.clone()),
        gateway,
        mpesa: common::mpesa_config("http://127.0.0.1:1"),
        pending_ttl: Duration::minutes(15),
    }
}

fn request(order_id: Uuid) -> StkPushRequest {
    StkPushRequest {
        phone: "0712345678".to_string(),
        amount: dec!(149.50),
        order_id: order_id.to_string(),
        account_reference: "ORDER-abcdef12".to_string(),
        transaction_desc: "Pure Squeeze Order - 2 items".to_string(),
    }
}

#[tokio::test]
async fn accepted_push_attaches_correlation_id() {
    let store = InMemoryOrderStore::new();
    let order = common::order(dec!(149.50));
    store.insert(order.clone()).await;
    let gateway = Arc::new(MockGateway::new("ALWAYS_ACCEPT"));

    let resp = service(&store, gateway.clone())
        .initiate(request(order.id))
        .await
        .unwrap();

    assert!(resp.success);
    assert_eq!(resp.message, "STK Push sent successfully");
    assert!(resp.checkout_request_id.starts_with("ws_CO_mock_"));
    assert_eq!(gateway.calls(), 1);

    let stored = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.mpesa_checkout_request_id.as_deref(), Some(resp.checkout_request_id.as_str()));
    assert_eq!(stored.status, OrderStatus::Pending);

    let pending = store.pending_payment(&resp.checkout_request_id).await.unwrap();
    assert_eq!(pending.order_id, order.id);
    assert_eq!(pending.expires_at - pending.created_at, Duration::minutes(15));
}

#[tokio::test]
async fn rejected_push_leaves_order_untouched() {
    let store = InMemoryOrderStore::new();
    let order = common::order(dec!(80));
    store.insert(order.clone()).await;

    let failure = service(&store, Arc::new(MockGateway::new("ALWAYS_REJECT")))
        .initiate(request(order.id))
        .await
        .unwrap_err();

    assert_eq!(
        failure,
        InitiationFailure::Rejected("Bad Request - Invalid PhoneNumber".to_string())
    );
    assert_eq!(failure.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        failure.body(),
        serde_json::json!({"success": false, "error": "Bad Request - Invalid PhoneNumber"})
    );

    let stored = store.get_order(order.id).await.unwrap().unwrap();
    assert!(stored.mpesa_checkout_request_id.is_none());
}

#[tokio::test]
async fn token_failure_is_reported_as_server_error() {
    let store = InMemoryOrderStore::new();
    let order = common::order(dec!(80));
    store.insert(order.clone()).await;

    let failure = service(&store, Arc::new(MockGateway::new("AUTH_FAILURE")))
        .initiate(request(order.id))
        .await
        .unwrap_err();

    assert_eq!(failure, InitiationFailure::Authentication);
    assert_eq!(failure.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(failure.body()["error"], "Payment service authentication failed");
    assert!(store.get_order(order.id).await.unwrap().unwrap().mpesa_checkout_request_id.is_none());
}

#[tokio::test]
async fn missing_credentials_short_circuit_before_provider() {
    let store = InMemoryOrderStore::new();
    let gateway = Arc::new(MockGateway::new("ALWAYS_ACCEPT"));
    let mut svc = service(&store, gateway.clone());
    svc.mpesa.consumer_secret = String::new();

    let failure = svc.initiate(request(Uuid::new_v4())).await.unwrap_err();

    assert_eq!(failure, InitiationFailure::Configuration);
    assert_eq!(failure.body(), serde_json::json!({"error": "Payment service configuration error"}));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn undecodable_provider_reply_is_internal_error() {
    let store = InMemoryOrderStore::new();
    let failure = service(&store, Arc::new(MockGateway::new("GARBLED")))
        .initiate(request(Uuid::new_v4()))
        .await
        .unwrap_err();

    assert_eq!(failure.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = failure.body();
    assert_eq!(body["error"], "Internal server error");
    assert!(body["details"].as_str().unwrap().contains("garbled"));
}

#[tokio::test]
async fn accepted_push_for_unknown_order_still_succeeds() {
    let store = InMemoryOrderStore::new();
    let resp = service(&store, Arc::new(MockGateway::new("ALWAYS_ACCEPT")))
        .initiate(request(Uuid::new_v4()))
        .await
        .unwrap();

    assert!(resp.success);
    assert!(store.pending_payment(&resp.checkout_request_id).await.is_none());
}

#[tokio::test]
async fn command_forwards_request_fields() {
    let store = InMemoryOrderStore::new();
    let gateway = Arc::new(MockGateway::new("ALWAYS_ACCEPT"));
    service(&store, gateway.clone())
        .initiate(request(Uuid::new_v4()))
        .await
        .unwrap();

    let cmd = gateway.last_command().unwrap();
    assert_eq!(cmd.phone, "0712345678");
    assert_eq!(cmd.amount, dec!(149.50));
    assert_eq!(cmd.account_reference, "ORDER-abcdef12");
}

#[tokio::test]
async fn store_failure_after_acceptance_still_reports_success() {
    let gateway = Arc::new(MockGateway::new("ALWAYS_ACCEPT"));
    let svc = PaymentService {
        orders: Arc::new(common::BrokenStore(common::Fault::Error)),
        gateway: gateway.clone(),
        mpesa: common::mpesa_config("http://127.0.0.1:1"),
        pending_ttl: Duration::minutes(15),
    };

    let resp = svc.initiate(request(Uuid::new_v4())).await.unwrap();

    assert!(resp.success);
    assert_eq!(resp.message, "STK Push sent successfully");
    assert!(!resp.checkout_request_id.is_empty());
    assert_eq!(gateway.calls(), 1);
}
