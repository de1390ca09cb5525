#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use squeeze_payments::config::{AppConfig, GatewayKind, MpesaConfig};
use squeeze_payments::domain::order::{DeliveryType, NewOrder, Order, OrderItem, OrderStatus};
use squeeze_payments::domain::payment::{PaymentLogEntry, PendingPayment, StoredPaymentLog};
use squeeze_payments::domain::ports::{OrderStore, PaymentLogStore};
use squeeze_payments::repo::in_memory::{InMemoryOrderStore, InMemoryPaymentLogStore};
use uuid::Uuid;

pub fn mpesa_config(base_url: &str) -> MpesaConfig {
    MpesaConfig {
        base_url: base_url.to_string(),
        consumer_key: "test-key".to_string(),
        consumer_secret: "test-secret".to_string(),
        short_code: "174379".to_string(),
        passkey: "test-passkey".to_string(),
        callback_url: "https://shop.example/mpesa/callback".to_string(),
        callback_token: None,
        timeout_ms: 2_000,
    }
}

pub fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        internal_api_key: "test-admin-key".to_string(),
        gateway: GatewayKind::Mock,
        mpesa: mpesa_config("http://127.0.0.1:1"),
        callback_dedup: false,
        pending_payment_ttl_secs: 900,
        sweep_interval_secs: 60,
    }
}

pub fn order(total: Decimal) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::new_v4(),
        customer_name: "Achieng".to_string(),
        customer_email: "achieng@example.com".to_string(),
        customer_phone: "0712345678".to_string(),
        delivery_address: Some("Westlands, Nairobi".to_string()),
        delivery_type: DeliveryType::Delivery,
        total_amount: total,
        status: OrderStatus::Pending,
        payment_method: "mpesa".to_string(),
        mpesa_checkout_request_id: None,
        mpesa_receipt_number: None,
        created_at: now,
        updated_at: now,
    }
}

/// An order that already went through initiation with `checkout_request_id`.
pub async fn seeded_order(store: &InMemoryOrderStore, checkout_request_id: &str) -> Order {
    let mut o = order(Decimal::new(150, 0));
    o.mpesa_checkout_request_id = Some(checkout_request_id.to_string());
    store.insert(o.clone()).await;
    o
}

pub fn stores() -> (InMemoryOrderStore, InMemoryPaymentLogStore) {
    (InMemoryOrderStore::new(), InMemoryPaymentLogStore::new())
}

pub fn success_callback(checkout_request_id: &str, amount: u64, receipt: &str) -> serde_json::Value {
    serde_json::json!({
        "Body": {
            "stkCallback": {
                "MerchantRequestID": "29115-34620561-1",
                "CheckoutRequestID": checkout_request_id,
                "ResultCode": 0,
                "ResultDesc": "The service request is processed successfully.",
                "CallbackMetadata": {
                    "Item": [
                        {"Name": "Amount", "Value": amount},
                        {"Name": "MpesaReceiptNumber", "Value": receipt},
                        {"Name": "Balance"},
                        {"Name": "TransactionDate", "Value": 20240307090501u64},
                        {"Name": "PhoneNumber", "Value": 254712345678u64}
                    ]
                }
            }
        }
    })
}

pub fn failed_callback(checkout_request_id: &str, result_code: i64) -> serde_json::Value {
    serde_json::json!({
        "Body": {
            "stkCallback": {
                "MerchantRequestID": "29115-34620561-1",
                "CheckoutRequestID": checkout_request_id,
                "ResultCode": result_code,
                "ResultDesc": "Request cancelled by user"
            }
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Error,
    Panic,
}

/// Store whose every call fails, either with an error or a panic.
#[derive(Debug, Clone, Copy)]
pub struct BrokenStore(pub Fault);

impl BrokenStore {
    fn fail<T>(&self, op: &str) -> Result<T> {
        match self.0 {
            Fault::Error => Err(anyhow!("{} failed: connection reset", op)),
            Fault::Panic => panic!("{} blew up", op),
        }
    }
}

#[async_trait]
impl OrderStore for BrokenStore {
    async fn create_order(&self, _order: NewOrder) -> Result<(Order, Vec<OrderItem>)> {
        self.fail("create_order")
    }

    async fn get_order(&self, _order_id: Uuid) -> Result<Option<Order>> {
        self.fail("get_order")
    }

    async fn attach_checkout_request(&self, _pending: &PendingPayment) -> Result<u64> {
        self.fail("attach_checkout_request")
    }

    async fn mark_paid(&self, _checkout_request_id: &str, _receipt_number: &str) -> Result<u64> {
        self.fail("mark_paid")
    }

    async fn mark_cancelled(&self, _checkout_request_id: &str) -> Result<u64> {
        self.fail("mark_cancelled")
    }

    async fn resolve_pending(&self, _checkout_request_id: &str) -> Result<()> {
        self.fail("resolve_pending")
    }

    async fn expire_pending(&self, _now: DateTime<Utc>) -> Result<(Vec<PendingPayment>, u64)> {
        self.fail("expire_pending")
    }

    async fn ping(&self) -> Result<()> {
        self.fail("ping")
    }
}

#[async_trait]
impl PaymentLogStore for BrokenStore {
    async fn append(&self, _entry: &PaymentLogEntry) -> Result<i64> {
        self.fail("append")
    }

    async fn exists(&self, _checkout_request_id: &str, _result_code: i64) -> Result<bool> {
        self.fail("exists")
    }

    async fn list_by_checkout_request(&self, _checkout_request_id: &str) -> Result<Vec<StoredPaymentLog>> {
        self.fail("list_by_checkout_request")
    }
}
