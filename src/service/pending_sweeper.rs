use crate::domain::payment::SweepReport;
use crate::domain::ports::OrderStore;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct PendingSweeper {
    pub orders: Arc<dyn OrderStore>,
    pub interval: std::time::Duration,
}

impl PendingSweeper {
    pub async fn run(self) {
        loop {
            if let Err(err) = self.tick().await {
                tracing::error!("pending payment sweep error: {}", err);
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    pub async fn tick(&self) -> Result<SweepReport> {
        let (expired, cancelled) = self.orders.expire_pending(Utc::now()).await?;
        for p in &expired {
            tracing::info!(
                checkout_request_id = %p.checkout_request_id,
                order_id = %p.order_id,
                "pending payment expired without callback"
            );
        }

        Ok(SweepReport {
            expired: expired.len(),
            orders_cancelled: cancelled as usize,
        })
    }
}
