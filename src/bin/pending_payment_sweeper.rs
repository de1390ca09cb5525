use anyhow::Result;
use squeeze_payments::config::AppConfig;
use squeeze_payments::repo::orders_repo::OrdersRepo;
use squeeze_payments::service::pending_sweeper::PendingSweeper;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Standalone expiry worker for deployments that run the API without the
/// in-process sweeper.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&cfg.database_url)
        .await?;

    let sweeper = PendingSweeper {
        orders: Arc::new(OrdersRepo { pool }),
        interval: std::time::Duration::from_secs(cfg.sweep_interval_secs),
    };

    loop {
        let report = sweeper.tick().await?;
        if report.expired > 0 {
            tracing::info!(
                expired = report.expired,
                cancelled = report.orders_cancelled,
                "swept pending payments"
            );
        }
        tokio::time::sleep(sweeper.interval).await;
    }
}
