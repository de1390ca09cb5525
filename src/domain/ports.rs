use crate::domain::order::{NewOrder, Order, OrderItem};
use crate::domain::payment::{PaymentLogEntry, PendingPayment, StoredPaymentLog};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>)>;

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>>;

    /// Stores the correlation id on the order, forces it back to `pending`
    /// and records the pending-payment mapping. Returns rows updated.
    async fn attach_checkout_request(&self, pending: &PendingPayment) -> Result<u64>;

    /// Moves a `pending` (or already `paid`) order to `paid`. A cancelled
    /// order is left alone and counts as zero rows.
    async fn mark_paid(&self, checkout_request_id: &str, receipt_number: &str) -> Result<u64>;

    /// Mirror of `mark_paid`: never touches a `paid` order.
    async fn mark_cancelled(&self, checkout_request_id: &str) -> Result<u64>;

    async fn resolve_pending(&self, checkout_request_id: &str) -> Result<()>;

    /// Removes mappings that expired before `now` and cancels their orders
    /// when they are still pending.
    async fn expire_pending(&self, now: DateTime<Utc>) -> Result<(Vec<PendingPayment>, u64)>;

    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait PaymentLogStore: Send + Sync {
    async fn append(&self, entry: &PaymentLogEntry) -> Result<i64>;

    async fn exists(&self, checkout_request_id: &str, result_code: i64) -> Result<bool>;

    async fn list_by_checkout_request(&self, checkout_request_id: &str) -> Result<Vec<StoredPaymentLog>>;
}
