use crate::domain::payment::{PaymentLogEntry, PaymentLogStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: CallbackBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID", default)]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    pub result_code: i64,
    #[serde(default)]
    pub result_desc: String,
    #[serde(default)]
    pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item", default)]
    pub items: Vec<MetadataItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: Option<serde_json::Value>,
}

/// Fixed reply for every callback, whatever happened while processing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackAck {
    #[serde(rename = "ResultCode")]
    pub result_code: i64,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
}

impl CallbackAck {
    pub fn accepted() -> Self {
        Self {
            result_code: 0,
            result_desc: "Success".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaymentDetails {
    pub amount: Decimal,
    pub mpesa_receipt_number: String,
    pub transaction_date: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    Paid(PaymentDetails),
    Cancelled,
}

impl StkCallback {
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    pub fn outcome(&self) -> CallbackOutcome {
        if !self.is_success() {
            return CallbackOutcome::Cancelled;
        }

        let mut details = PaymentDetails::default();
        let items = self
            .callback_metadata
            .as_ref()
            .map(|m| m.items.as_slice())
            .unwrap_or_default();
        for item in items {
            let Some(value) = item.value.as_ref() else {
                continue;
            };
            match item.name.as_str() {
                "Amount" => details.amount = value_to_decimal(value).unwrap_or_default(),
                "MpesaReceiptNumber" => details.mpesa_receipt_number = value_to_string(value),
                "TransactionDate" => details.transaction_date = value_to_string(value),
                "PhoneNumber" => details.phone_number = value_to_string(value),
                _ => {}
            }
        }

        CallbackOutcome::Paid(details)
    }

    pub fn log_entry(&self, outcome: &CallbackOutcome) -> PaymentLogEntry {
        let mut entry = PaymentLogEntry {
            checkout_request_id: self.checkout_request_id.clone(),
            merchant_request_id: self.merchant_request_id.clone(),
            result_code: self.result_code,
            result_desc: self.result_desc.clone(),
            amount: None,
            mpesa_receipt_number: None,
            transaction_date: None,
            phone_number: None,
            status: PaymentLogStatus::Failed,
        };
        if let CallbackOutcome::Paid(details) = outcome {
            entry.amount = Some(details.amount);
            entry.mpesa_receipt_number = Some(details.mpesa_receipt_number.clone());
            entry.transaction_date = Some(details.transaction_date.clone());
            entry.phone_number = Some(details.phone_number.clone());
            entry.status = PaymentLogStatus::Success;
        }
        entry
    }
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn value_to_decimal(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}
