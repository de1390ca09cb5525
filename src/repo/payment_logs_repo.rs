use crate::domain::payment::{PaymentLogEntry, PaymentLogStatus, StoredPaymentLog};
use crate::domain::ports::PaymentLogStore;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PaymentLogsRepo {
    pub pool: PgPool,
}

#[async_trait]
impl PaymentLogStore for PaymentLogsRepo {
    async fn append(&self, entry: &PaymentLogEntry) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO payment_logs (
                checkout_request_id, merchant_request_id, result_code, result_desc, amount,
                mpesa_receipt_number, transaction_date, phone_number, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&entry.checkout_request_id)
        .bind(&entry.merchant_request_id)
        .bind(entry.result_code)
        .bind(&entry.result_desc)
        .bind(entry.amount)
        .bind(&entry.mpesa_receipt_number)
        .bind(&entry.transaction_date)
        .bind(&entry.phone_number)
        .bind(entry.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    async fn exists(&self, checkout_request_id: &str, result_code: i64) -> Result<bool> {
        let row = sqlx::query(
            "SELECT 1 AS hit FROM payment_logs WHERE checkout_request_id = $1 AND result_code = $2 LIMIT 1",
        )
        .bind(checkout_request_id)
        .bind(result_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn list_by_checkout_request(&self, checkout_request_id: &str) -> Result<Vec<StoredPaymentLog>> {
        let rows = sqlx::query(
            r#"
            SELECT id, checkout_request_id, merchant_request_id, result_code, result_desc, amount,
                   mpesa_receipt_number, transaction_date, phone_number, status, created_at
            FROM payment_logs
            WHERE checkout_request_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(checkout_request_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let status: String = r.get("status");
                Ok(StoredPaymentLog {
                    id: r.get("id"),
                    entry: PaymentLogEntry {
                        checkout_request_id: r.get("checkout_request_id"),
                        merchant_request_id: r.get("merchant_request_id"),
                        result_code: r.get("result_code"),
                        result_desc: r.get("result_desc"),
                        amount: r.get("amount"),
                        mpesa_receipt_number: r.get("mpesa_receipt_number"),
                        transaction_date: r.get("transaction_date"),
                        phone_number: r.get("phone_number"),
                        status: PaymentLogStatus::parse(&status)
                            .ok_or_else(|| anyhow!("unknown payment log status {}", status))?,
                    },
                    created_at: r.get("created_at"),
                })
            })
            .collect()
    }
}
