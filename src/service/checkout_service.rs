use crate::domain::order::{account_reference, transaction_desc, CheckoutRequest, CheckoutResponse, Order};
use crate::domain::payment::{ErrorEnvelope, ErrorPayload};
use crate::domain::ports::OrderStore;
use axum::http::StatusCode;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CheckoutService {
    pub orders: Arc<dyn OrderStore>,
}

impl CheckoutService {
    pub async fn checkout(&self, req: CheckoutRequest) -> Result<CheckoutResponse, (StatusCode, ErrorEnvelope)> {
        let order = req
            .validate()
            .map_err(|r| (StatusCode::BAD_REQUEST, err(r.code(), r.message())))?;
        let item_count = order.item_count();

        let (order, items) = self.orders.create_order(order).await.map_err(internal)?;
        tracing::info!(order_id = %order.id, total = %order.total_amount, "order created");

        Ok(CheckoutResponse {
            account_reference: account_reference(order.id),
            transaction_desc: transaction_desc(item_count),
            order,
            items,
        })
    }

    pub async fn get(&self, order_id: Uuid) -> Result<Order, (StatusCode, ErrorEnvelope)> {
        self.orders
            .get_order(order_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| (StatusCode::NOT_FOUND, err("ORDER_NOT_FOUND", "order not found")))
    }
}

fn err(code: &str, message: &str) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        },
    }
}

fn internal(e: anyhow::Error) -> (StatusCode, ErrorEnvelope) {
    tracing::error!("order store error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorEnvelope {
            error: ErrorPayload {
                code: "INTERNAL".to_string(),
                message: "internal error".to_string(),
                details: Some(e.to_string()),
            },
        },
    )
}
