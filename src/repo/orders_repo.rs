use crate::domain::order::{DeliveryType, NewOrder, Order, OrderItem, OrderStatus};
use crate::domain::payment::PendingPayment;
use crate::domain::ports::OrderStore;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrdersRepo {
    pub pool: PgPool,
}

const ORDER_COLUMNS: &str = r#"
    id, customer_name, customer_email, customer_phone, delivery_address, delivery_type,
    total_amount, status, payment_method, mpesa_checkout_request_id, mpesa_receipt_number,
    created_at, updated_at
"#;

fn order_from_row(r: &PgRow) -> Result<Order> {
    let status: String = r.get("status");
    let delivery_type: String = r.get("delivery_type");
    Ok(Order {
        id: r.get("id"),
        customer_name: r.get("customer_name"),
        customer_email: r.get("customer_email"),
        customer_phone: r.get("customer_phone"),
        delivery_address: r.get("delivery_address"),
        delivery_type: DeliveryType::parse(&delivery_type)
            .ok_or_else(|| anyhow!("unknown delivery_type {}", delivery_type))?,
        total_amount: r.get("total_amount"),
        status: OrderStatus::parse(&status).ok_or_else(|| anyhow!("unknown order status {}", status))?,
        payment_method: r.get("payment_method"),
        mpesa_checkout_request_id: r.get("mpesa_checkout_request_id"),
        mpesa_receipt_number: r.get("mpesa_receipt_number"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl OrderStore for OrdersRepo {
    async fn create_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>)> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (
                id, customer_name, customer_email, customer_phone, delivery_address,
                delivery_type, total_amount, status, payment_method
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', 'mpesa')
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(&order.customer_phone)
        .bind(&order.delivery_address)
        .bind(order.delivery_type.as_str())
        .bind(order.total_amount())
        .fetch_one(tx.as_mut())
        .await?;
        let stored = order_from_row(&row)?;

        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(stored.id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total_price())
            .execute(tx.as_mut())
            .await?;

            items.push(OrderItem {
                order_id: stored.id,
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total_price: item.total_price(),
            });
        }

        tx.commit().await?;
        Ok((stored, items))
    }

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn attach_checkout_request(&self, pending: &PendingPayment) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET mpesa_checkout_request_id = $2, status = 'pending', updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(pending.order_id)
        .bind(&pending.checkout_request_id)
        .execute(tx.as_mut())
        .await?
        .rows_affected();

        if updated > 0 {
            sqlx::query(
                r#"
                INSERT INTO pending_payments (checkout_request_id, merchant_request_id, order_id, created_at, expires_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (checkout_request_id) DO NOTHING
                "#,
            )
            .bind(&pending.checkout_request_id)
            .bind(&pending.merchant_request_id)
            .bind(pending.order_id)
            .bind(pending.created_at)
            .bind(pending.expires_at)
            .execute(tx.as_mut())
            .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn mark_paid(&self, checkout_request_id: &str, receipt_number: &str) -> Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'paid', mpesa_receipt_number = $2, updated_at = now()
            WHERE mpesa_checkout_request_id = $1 AND status IN ('pending', 'paid')
            "#,
        )
        .bind(checkout_request_id)
        .bind(receipt_number)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }

    async fn mark_cancelled(&self, checkout_request_id: &str) -> Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'cancelled', updated_at = now()
            WHERE mpesa_checkout_request_id = $1 AND status IN ('pending', 'cancelled')
            "#,
        )
        .bind(checkout_request_id)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }

    async fn resolve_pending(&self, checkout_request_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM pending_payments WHERE checkout_request_id = $1")
            .bind(checkout_request_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn expire_pending(&self, now: DateTime<Utc>) -> Result<(Vec<PendingPayment>, u64)> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(
            r#"
            DELETE FROM pending_payments
            WHERE checkout_request_id IN (
                SELECT checkout_request_id FROM pending_payments
                WHERE expires_at <= $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING checkout_request_id, merchant_request_id, order_id, created_at, expires_at
            "#,
        )
        .bind(now)
        .fetch_all(tx.as_mut())
        .await?;

        let expired: Vec<PendingPayment> = rows
            .into_iter()
            .map(|r| PendingPayment {
                checkout_request_id: r.get("checkout_request_id"),
                merchant_request_id: r.get("merchant_request_id"),
                order_id: r.get("order_id"),
                created_at: r.get("created_at"),
                expires_at: r.get("expires_at"),
            })
            .collect();

        if expired.is_empty() {
            tx.rollback().await?;
            return Ok((expired, 0));
        }

        let ids: Vec<String> = expired.iter().map(|p| p.checkout_request_id.clone()).collect();
        let cancelled = sqlx::query(
            r#"
            UPDATE orders SET status = 'cancelled', updated_at = now()
            WHERE mpesa_checkout_request_id = ANY($1) AND status = 'pending'
            "#,
        )
        .bind(&ids)
        .execute(tx.as_mut())
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok((expired, cancelled))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
