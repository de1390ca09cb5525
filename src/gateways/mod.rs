use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod daraja;
pub mod mock;

#[derive(Debug, Clone)]
pub struct StkPushCommand {
    pub phone: String,
    pub amount: Decimal,
    pub account_reference: String,
    pub transaction_desc: String,
}

/// The provider's reply to a push request. `response_code == "0"` means accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StkPushReply {
    #[serde(rename = "MerchantRequestID", default)]
    pub merchant_request_id: Option<String>,
    #[serde(rename = "CheckoutRequestID", default)]
    pub checkout_request_id: Option<String>,
    #[serde(rename = "ResponseCode", default)]
    pub response_code: Option<String>,
    #[serde(rename = "ResponseDescription", default)]
    pub response_description: Option<String>,
    #[serde(rename = "CustomerMessage", default)]
    pub customer_message: Option<String>,
    #[serde(rename = "errorCode", default)]
    pub error_code: Option<String>,
    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Accepted {
        checkout_request_id: String,
        merchant_request_id: String,
    },
    Rejected {
        message: String,
    },
}

impl StkPushReply {
    pub fn outcome(&self) -> PushOutcome {
        match (self.response_code.as_deref(), &self.checkout_request_id) {
            (Some("0"), Some(checkout_request_id)) => PushOutcome::Accepted {
                checkout_request_id: checkout_request_id.clone(),
                merchant_request_id: self.merchant_request_id.clone().unwrap_or_default(),
            },
            _ => PushOutcome::Rejected {
                message: self
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "Payment request failed".to_string()),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("token endpoint answered {status}")]
    Authentication { status: u16 },
    #[error("request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected provider response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    /// Exchanges credentials for a token, then submits the push request.
    /// Exactly one call to each endpoint, no retries.
    async fn stk_push(&self, command: StkPushCommand) -> Result<StkPushReply, GatewayError>;
}
