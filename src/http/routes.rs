use crate::http::handlers::{admin, callback, ops, orders, payments};
use crate::http::middleware::admin_auth::require_internal_api_key;
use crate::AppState;
use axum::http::{HeaderName, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static("content-type"),
        ])
}

pub fn build_router(state: AppState, admin_key: String) -> Router {
    let admin_routes = Router::new()
        .route(
            "/admin/payment-logs/:checkout_request_id",
            get(admin::list_payment_logs),
        )
        .route("/admin/pending-payments/sweep", post(admin::sweep_pending))
        .layer(from_fn_with_state(admin_key, require_internal_api_key));

    Router::new()
        .route("/health", get(payments::health))
        .route(
            "/mpesa/payment",
            post(payments::initiate_stk_push)
                .options(payments::preflight)
                .fallback(payments::method_not_allowed),
        )
        .route(
            "/mpesa/callback",
            post(callback::mpesa_callback)
                .options(payments::preflight)
                .fallback(payments::method_not_allowed),
        )
        .route("/orders", post(orders::create_order).options(payments::preflight))
        .route("/orders/:order_id", get(orders::get_order))
        .route("/ops/readiness", get(ops::readiness))
        .route("/ops/liveness", get(ops::liveness))
        .merge(admin_routes)
        .layer(cors())
        .with_state(state)
}
