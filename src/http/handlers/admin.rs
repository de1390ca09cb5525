use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

pub async fn list_payment_logs(
    State(state): State<AppState>,
    Path(checkout_request_id): Path<String>,
) -> impl IntoResponse {
    match state.payment_logs.list_by_checkout_request(&checkout_request_id).await {
        Ok(entries) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({
                "checkout_request_id": checkout_request_id,
                "total": entries.len(),
                "entries": entries
            })),
        )
            .into_response(),
        Err(e) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

pub async fn sweep_pending(State(state): State<AppState>) -> impl IntoResponse {
    match state.sweeper.tick().await {
        Ok(report) => (axum::http::StatusCode::OK, Json(report)).into_response(),
        Err(e) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}
