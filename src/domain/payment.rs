use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StkPushRequest {
    pub phone: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub order_id: String,
    pub account_reference: String,
    pub transaction_desc: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StkPushAccepted {
    pub success: bool,
    pub message: String,
    pub checkout_request_id: String,
    pub merchant_request_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StkPushRejected {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InternalErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentLogStatus {
    Success,
    Failed,
}

impl PaymentLogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentLogStatus::Success => "success",
            PaymentLogStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(PaymentLogStatus::Success),
            "failed" => Some(PaymentLogStatus::Failed),
            _ => None,
        }
    }
}

/// One processed callback. Metadata fields are only populated on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentLogEntry {
    pub checkout_request_id: String,
    pub merchant_request_id: String,
    pub result_code: i64,
    pub result_desc: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub mpesa_receipt_number: Option<String>,
    pub transaction_date: Option<String>,
    pub phone_number: Option<String>,
    pub status: PaymentLogStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredPaymentLog {
    pub id: i64,
    #[serde(flatten)]
    pub entry: PaymentLogEntry,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingPayment {
    pub checkout_request_id: String,
    pub merchant_request_id: String,
    pub order_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub expired: usize,
    pub orders_cancelled: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}
