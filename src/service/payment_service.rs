use crate::config::MpesaConfig;
use crate::domain::payment::{InternalErrorBody, PendingPayment, StkPushAccepted, StkPushRejected, StkPushRequest};
use crate::domain::ports::OrderStore;
use crate::gateways::{GatewayError, PaymentGateway, PushOutcome, StkPushCommand};
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitiationFailure {
    Configuration,
    Authentication,
    Rejected(String),
    Internal(String),
}

impl InitiationFailure {
    pub fn status(&self) -> StatusCode {
        match self {
            InitiationFailure::Rejected(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> serde_json::Value {
        let body = match self {
            InitiationFailure::Rejected(message) => {
                return serde_json::to_value(StkPushRejected {
                    success: false,
                    error: message.clone(),
                })
                .unwrap_or_default()
            }
            InitiationFailure::Configuration => InternalErrorBody {
                error: "Payment service configuration error".to_string(),
                details: None,
            },
            InitiationFailure::Authentication => InternalErrorBody {
                error: "Payment service authentication failed".to_string(),
                details: None,
            },
            InitiationFailure::Internal(details) => InternalErrorBody {
                error: "Internal server error".to_string(),
                details: Some(details.clone()),
            },
        };
        serde_json::to_value(body).unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct PaymentService {
    pub orders: Arc<dyn OrderStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub mpesa: MpesaConfig,
    pub pending_ttl: Duration,
}

impl PaymentService {
    pub async fn initiate(&self, req: StkPushRequest) -> Result<StkPushAccepted, InitiationFailure> {
        if !self.mpesa.has_credentials() {
            tracing::error!("mpesa credentials not configured");
            return Err(InitiationFailure::Configuration);
        }

        let order_id = match Uuid::parse_str(req.order_id.trim()) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(order_id = %req.order_id, "invalid order id: {}", e);
                return Err(InitiationFailure::Internal(format!("invalid orderId: {}", e)));
            }
        };

        let command = StkPushCommand {
            phone: req.phone,
            amount: req.amount,
            account_reference: req.account_reference,
            transaction_desc: req.transaction_desc,
        };

        let reply = match self.gateway.stk_push(command).await {
            Ok(reply) => reply,
            Err(GatewayError::Authentication { status }) => {
                tracing::error!(status, gateway = self.gateway.name(), "failed to get mpesa access token");
                return Err(InitiationFailure::Authentication);
            }
            Err(e) => {
                tracing::error!(order_id = %order_id, "stk push error: {}", e);
                return Err(InitiationFailure::Internal(e.to_string()));
            }
        };

        match reply.outcome() {
            PushOutcome::Accepted {
                checkout_request_id,
                merchant_request_id,
            } => {
                let now = Utc::now();
                let pending = PendingPayment {
                    checkout_request_id: checkout_request_id.clone(),
                    merchant_request_id: merchant_request_id.clone(),
                    order_id,
                    created_at: now,
                    expires_at: now + self.pending_ttl,
                };
                match self.orders.attach_checkout_request(&pending).await {
                    Ok(0) => tracing::warn!(
                        order_id = %order_id,
                        checkout_request_id = %checkout_request_id,
                        "stk push accepted for unknown order"
                    ),
                    Ok(_) => tracing::info!(
                        order_id = %order_id,
                        checkout_request_id = %checkout_request_id,
                        "order awaiting payment"
                    ),
                    Err(e) => tracing::error!(order_id = %order_id, "error updating order: {}", e),
                }

                Ok(StkPushAccepted {
                    success: true,
                    message: "STK Push sent successfully".to_string(),
                    checkout_request_id,
                    merchant_request_id,
                })
            }
            PushOutcome::Rejected { message } => {
                tracing::warn!(order_id = %order_id, ?reply, "stk push failed");
                Err(InitiationFailure::Rejected(message))
            }
        }
    }
}
