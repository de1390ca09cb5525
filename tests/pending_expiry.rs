mod common;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use squeeze_payments::domain::order::OrderStatus;
use squeeze_payments::domain::payment::{PaymentLogStatus, PendingPayment};
use squeeze_payments::domain::ports::OrderStore;
use squeeze_payments::repo::in_memory::{InMemoryOrderStore, InMemoryPaymentLogStore};
use squeeze_payments::service::callback_service::{CallbackDisposition, CallbackService};
use squeeze_payments::service::pending_sweeper::PendingSweeper;
use std::sync::Arc;
use uuid::Uuid;

async fn attach(store: &InMemoryOrderStore, checkout_request_id: &str, age: Duration, ttl: Duration) -> Uuid {
    let order = common::order(dec!(200));
    store.insert(order.clone()).await;
    let created_at = Utc::now() - age;
    store
        .attach_checkout_request(&PendingPayment {
            checkout_request_id: checkout_request_id.to_string(),
            merchant_request_id: format!("m-{}", checkout_request_id),
            order_id: order.id,
            created_at,
            expires_at: created_at + ttl,
        })
        .await
        .unwrap();
    order.id
}

fn sweeper(store: &InMemoryOrderStore) -> PendingSweeper {
    PendingSweeper {
        orders: Arc::new(store.clone()),
        interval: std::time::Duration::from_secs(60),
    }
}

#[tokio::test]
async fn expired_pending_payment_cancels_order() {
    let store = InMemoryOrderStore::new();
    let stale = attach(&store, "ws_CO_stale", Duration::minutes(30), Duration::minutes(15)).await;
    let fresh = attach(&store, "ws_CO_fresh", Duration::minutes(1), Duration::minutes(15)).await;

    let report = sweeper(&store).tick().await.unwrap();

    assert_eq!(report.expired, 1);
    assert_eq!(report.orders_cancelled, 1);
    assert_eq!(store.get_order(stale).await.unwrap().unwrap().status, OrderStatus::Cancelled);
    assert_eq!(store.get_order(fresh).await.unwrap().unwrap().status, OrderStatus::Pending);
    assert!(store.pending_payment("ws_CO_stale").await.is_none());
    assert!(store.pending_payment("ws_CO_fresh").await.is_some());
}

#[tokio::test]
async fn expiry_does_not_reopen_terminal_orders() {
    let store = InMemoryOrderStore::new();
    let id = attach(&store, "ws_CO_paid", Duration::minutes(30), Duration::minutes(15)).await;
    store.mark_paid("ws_CO_paid", "RCPT1").await.unwrap();

    let report = sweeper(&store).tick().await.unwrap();

    assert_eq!(report.expired, 1);
    assert_eq!(report.orders_cancelled, 0);
    assert_eq!(store.get_order(id).await.unwrap().unwrap().status, OrderStatus::Paid);
}

#[tokio::test]
async fn empty_sweep_reports_nothing() {
    let store = InMemoryOrderStore::new();
    let report = sweeper(&store).tick().await.unwrap();
    assert_eq!(report.expired, 0);
    assert_eq!(report.orders_cancelled, 0);
}

#[tokio::test]
async fn late_success_after_expiry_is_logged_but_order_stays_cancelled() {
    let store = InMemoryOrderStore::new();
    let logs = InMemoryPaymentLogStore::new();
    let id = attach(&store, "ws_CO_late", Duration::minutes(30), Duration::minutes(15)).await;
    sweeper(&store).tick().await.unwrap();

    let svc = CallbackService {
        orders: Arc::new(store.clone()),
        payment_logs: Arc::new(logs.clone()),
        callback_token: None,
        dedup: false,
    };
    let payload = serde_json::to_vec(&common::success_callback("ws_CO_late", 200, "LATE01")).unwrap();
    let disposition = svc.process(None, &payload).await.unwrap();

    assert_eq!(disposition, CallbackDisposition::Applied { orders_updated: 0 });
    let stored = store.get_order(id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Cancelled);
    assert!(stored.mpesa_receipt_number.is_none());

    let entries = logs.all().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entry.status, PaymentLogStatus::Success);
    assert_eq!(entries[0].entry.mpesa_receipt_number.as_deref(), Some("LATE01"));
}
