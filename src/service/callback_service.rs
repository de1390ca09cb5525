use crate::domain::callback::{CallbackAck, CallbackEnvelope, CallbackOutcome, StkCallback};
use crate::domain::ports::{OrderStore, PaymentLogStore};
use anyhow::Result;
use axum::body::Bytes;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackDisposition {
    Applied { orders_updated: u64 },
    Duplicate,
    Unauthorized,
    Malformed,
}

#[derive(Clone)]
pub struct CallbackService {
    pub orders: Arc<dyn OrderStore>,
    pub payment_logs: Arc<dyn PaymentLogStore>,
    pub callback_token: Option<String>,
    pub dedup: bool,
}

impl CallbackService {
    /// Processes one webhook delivery and always yields the fixed
    /// acknowledgement. Errors and panics in processing are logged only.
    pub async fn receive(&self, token: Option<String>, body: Bytes) -> CallbackAck {
        let this = self.clone();
        let handle = tokio::spawn(async move { this.process(token.as_deref(), &body).await });

        match handle.await {
            Ok(Ok(disposition)) => {
                tracing::debug!(?disposition, "mpesa callback handled");
            }
            Ok(Err(e)) => {
                tracing::error!("error in mpesa callback: {:#}", e);
            }
            Err(join_err) => {
                tracing::error!("mpesa callback processing aborted: {}", join_err);
            }
        }

        CallbackAck::accepted()
    }

    pub async fn process(&self, token: Option<&str>, body: &[u8]) -> Result<CallbackDisposition> {
        if let Some(expected) = self.callback_token.as_deref() {
            if token != Some(expected) {
                tracing::warn!("mpesa callback rejected: missing or wrong token");
                return Ok(CallbackDisposition::Unauthorized);
            }
        }

        let envelope: CallbackEnvelope = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(
                    body = %String::from_utf8_lossy(body),
                    "unparseable mpesa callback: {}",
                    e
                );
                return Ok(CallbackDisposition::Malformed);
            }
        };
        let callback = envelope.body.stk_callback;

        tracing::info!(
            checkout_request_id = %callback.checkout_request_id,
            result_code = callback.result_code,
            "processing mpesa callback"
        );

        if self.dedup
            && self
                .payment_logs
                .exists(&callback.checkout_request_id, callback.result_code)
                .await?
        {
            tracing::info!(
                checkout_request_id = %callback.checkout_request_id,
                "duplicate mpesa callback ignored"
            );
            return Ok(CallbackDisposition::Duplicate);
        }

        self.apply(&callback).await
    }

    async fn apply(&self, callback: &StkCallback) -> Result<CallbackDisposition> {
        let outcome = callback.outcome();
        let checkout_request_id = callback.checkout_request_id.as_str();

        let updated = match &outcome {
            CallbackOutcome::Paid(details) => {
                tracing::info!(
                    amount = %details.amount,
                    receipt = %details.mpesa_receipt_number,
                    "payment successful"
                );
                self.orders
                    .mark_paid(checkout_request_id, &details.mpesa_receipt_number)
                    .await
            }
            CallbackOutcome::Cancelled => {
                tracing::info!(
                    result_code = callback.result_code,
                    result_desc = %callback.result_desc,
                    "payment failed"
                );
                self.orders.mark_cancelled(checkout_request_id).await
            }
        };

        let orders_updated = match updated {
            Ok(0) => {
                tracing::warn!(checkout_request_id, "no open order matches mpesa callback");
                0
            }
            Ok(n) => n,
            Err(e) => {
                tracing::error!(checkout_request_id, "error updating order: {:#}", e);
                0
            }
        };

        if let Err(e) = self.orders.resolve_pending(checkout_request_id).await {
            tracing::warn!(checkout_request_id, "error clearing pending payment: {:#}", e);
        }

        self.payment_logs.append(&callback.log_entry(&outcome)).await?;

        Ok(CallbackDisposition::Applied { orders_updated })
    }
}
