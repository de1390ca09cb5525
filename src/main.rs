use squeeze_payments::config::{AppConfig, GatewayKind};
use squeeze_payments::domain::ports::{OrderStore, PaymentLogStore};
use squeeze_payments::gateways::daraja::DarajaGateway;
use squeeze_payments::gateways::mock::MockGateway;
use squeeze_payments::gateways::PaymentGateway;
use squeeze_payments::http::routes::build_router;
use squeeze_payments::repo::orders_repo::OrdersRepo;
use squeeze_payments::repo::payment_logs_repo::PaymentLogsRepo;
use squeeze_payments::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    cfg.validate()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let orders: Arc<dyn OrderStore> = Arc::new(OrdersRepo { pool: pool.clone() });
    let payment_logs: Arc<dyn PaymentLogStore> = Arc::new(PaymentLogsRepo { pool: pool.clone() });
    let gateway: Arc<dyn PaymentGateway> = match cfg.gateway {
        GatewayKind::Daraja => Arc::new(DarajaGateway::new(cfg.mpesa.clone())),
        GatewayKind::Mock => {
            tracing::warn!("using mock mpesa gateway; no real payment prompts will be sent");
            Arc::new(MockGateway::new("ALWAYS_ACCEPT"))
        }
    };

    if cfg.mpesa.callback_token.is_none() {
        tracing::warn!("MPESA_CALLBACK_TOKEN unset; callbacks are accepted from any caller");
    }

    let state = AppState::new(&cfg, orders, payment_logs, gateway);
    tokio::spawn(state.sweeper.clone().run());

    let app = build_router(state, cfg.internal_api_key.clone());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
