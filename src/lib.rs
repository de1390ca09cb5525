pub mod config;
pub mod domain {
    pub mod callback;
    pub mod order;
    pub mod payment;
    pub mod phone;
    pub mod ports;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod admin;
        pub mod callback;
        pub mod ops;
        pub mod orders;
        pub mod payments;
    }
    pub mod middleware {
        pub mod admin_auth;
    }
    pub mod routes;
}
pub mod repo {
    pub mod in_memory;
    pub mod orders_repo;
    pub mod payment_logs_repo;
}
pub mod service {
    pub mod callback_service;
    pub mod checkout_service;
    pub mod payment_service;
    pub mod pending_sweeper;
}

use config::AppConfig;
use domain::ports::{OrderStore, PaymentLogStore};
use gateways::PaymentGateway;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
    pub callback_service: service::callback_service::CallbackService,
    pub checkout_service: service::checkout_service::CheckoutService,
    pub sweeper: service::pending_sweeper::PendingSweeper,
    pub orders: Arc<dyn OrderStore>,
    pub payment_logs: Arc<dyn PaymentLogStore>,
}

impl AppState {
    pub fn new(
        cfg: &AppConfig,
        orders: Arc<dyn OrderStore>,
        payment_logs: Arc<dyn PaymentLogStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            payment_service: service::payment_service::PaymentService {
                orders: orders.clone(),
                gateway,
                mpesa: cfg.mpesa.clone(),
                pending_ttl: chrono::Duration::seconds(cfg.pending_payment_ttl_secs),
            },
            callback_service: service::callback_service::CallbackService {
                orders: orders.clone(),
                payment_logs: payment_logs.clone(),
                callback_token: cfg.mpesa.callback_token.clone(),
                dedup: cfg.callback_dedup,
            },
            checkout_service: service::checkout_service::CheckoutService {
                orders: orders.clone(),
            },
            sweeper: service::pending_sweeper::PendingSweeper {
                orders: orders.clone(),
                interval: std::time::Duration::from_secs(cfg.sweep_interval_secs),
            },
            orders,
            payment_logs,
        }
    }
}
