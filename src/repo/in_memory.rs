use crate::domain::order::{NewOrder, Order, OrderItem, OrderStatus};
use crate::domain::payment::{PaymentLogEntry, PendingPayment, StoredPaymentLog};
use crate::domain::ports::{OrderStore, PaymentLogStore};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local stand-in for the `orders`, `order_items` and
/// `pending_payments` tables. Used by tests and the mock gateway mode.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<OrderTables>>,
}

#[derive(Default)]
struct OrderTables {
    orders: HashMap<Uuid, Order>,
    items: Vec<OrderItem>,
    pending: HashMap<String, PendingPayment>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an order as-is, bypassing checkout.
    pub async fn insert(&self, order: Order) {
        self.inner.write().await.orders.insert(order.id, order);
    }

    pub async fn pending_payment(&self, checkout_request_id: &str) -> Option<PendingPayment> {
        self.inner.read().await.pending.get(checkout_request_id).cloned()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>)> {
        let now = Utc::now();
        let stored = Order {
            id: Uuid::new_v4(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone(),
            delivery_address: order.delivery_address.clone(),
            delivery_type: order.delivery_type,
            total_amount: order.total_amount(),
            status: OrderStatus::Pending,
            payment_method: "mpesa".to_string(),
            mpesa_checkout_request_id: None,
            mpesa_receipt_number: None,
            created_at: now,
            updated_at: now,
        };
        let items: Vec<OrderItem> = order
            .items
            .iter()
            .map(|i| OrderItem {
                order_id: stored.id,
                product_id: i.product_id.clone(),
                quantity: i.quantity,
                unit_price: i.unit_price,
                total_price: i.total_price(),
            })
            .collect();

        let mut tables = self.inner.write().await;
        tables.orders.insert(stored.id, stored.clone());
        tables.items.extend(items.iter().cloned());
        Ok((stored, items))
    }

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>> {
        Ok(self.inner.read().await.orders.get(&order_id).cloned())
    }

    async fn attach_checkout_request(&self, pending: &PendingPayment) -> Result<u64> {
        let mut tables = self.inner.write().await;
        let Some(order) = tables.orders.get_mut(&pending.order_id) else {
            return Ok(0);
        };
        order.mpesa_checkout_request_id = Some(pending.checkout_request_id.clone());
        order.status = OrderStatus::Pending;
        order.updated_at = Utc::now();
        tables
            .pending
            .entry(pending.checkout_request_id.clone())
            .or_insert_with(|| pending.clone());
        Ok(1)
    }

    async fn mark_paid(&self, checkout_request_id: &str, receipt_number: &str) -> Result<u64> {
        let mut tables = self.inner.write().await;
        let mut updated = 0;
        for order in tables.orders.values_mut() {
            if order.mpesa_checkout_request_id.as_deref() == Some(checkout_request_id)
                && order.status != OrderStatus::Cancelled
            {
                order.status = OrderStatus::Paid;
                order.mpesa_receipt_number = Some(receipt_number.to_string());
                order.updated_at = Utc::now();
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn mark_cancelled(&self, checkout_request_id: &str) -> Result<u64> {
        let mut tables = self.inner.write().await;
        let mut updated = 0;
        for order in tables.orders.values_mut() {
            if order.mpesa_checkout_request_id.as_deref() == Some(checkout_request_id)
                && order.status != OrderStatus::Paid
            {
                order.status = OrderStatus::Cancelled;
                order.updated_at = Utc::now();
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn resolve_pending(&self, checkout_request_id: &str) -> Result<()> {
        self.inner.write().await.pending.remove(checkout_request_id);
        Ok(())
    }

    async fn expire_pending(&self, now: DateTime<Utc>) -> Result<(Vec<PendingPayment>, u64)> {
        let mut tables = self.inner.write().await;
        let due: Vec<String> = tables
            .pending
            .values()
            .filter(|p| p.expires_at <= now)
            .map(|p| p.checkout_request_id.clone())
            .collect();

        let mut expired = Vec::with_capacity(due.len());
        for id in due {
            if let Some(p) = tables.pending.remove(&id) {
                expired.push(p);
            }
        }

        let mut cancelled = 0;
        for order in tables.orders.values_mut() {
            let hit = expired
                .iter()
                .any(|p| order.mpesa_checkout_request_id.as_deref() == Some(p.checkout_request_id.as_str()));
            if hit && order.status == OrderStatus::Pending {
                order.status = OrderStatus::Cancelled;
                order.updated_at = now;
                cancelled += 1;
            }
        }

        Ok((expired, cancelled))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPaymentLogStore {
    entries: Arc<RwLock<Vec<StoredPaymentLog>>>,
}

impl InMemoryPaymentLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<StoredPaymentLog> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl PaymentLogStore for InMemoryPaymentLogStore {
    async fn append(&self, entry: &PaymentLogEntry) -> Result<i64> {
        let mut entries = self.entries.write().await;
        let id = entries.len() as i64 + 1;
        entries.push(StoredPaymentLog {
            id,
            entry: entry.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn exists(&self, checkout_request_id: &str, result_code: i64) -> Result<bool> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .any(|e| e.entry.checkout_request_id == checkout_request_id && e.entry.result_code == result_code))
    }

    async fn list_by_checkout_request(&self, checkout_request_id: &str) -> Result<Vec<StoredPaymentLog>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.entry.checkout_request_id == checkout_request_id)
            .cloned()
            .collect())
    }
}
