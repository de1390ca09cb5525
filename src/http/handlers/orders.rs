use crate::domain::order::CheckoutRequest;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> impl IntoResponse {
    match state.checkout_service.checkout(req).await {
        Ok(resp) => (axum::http::StatusCode::CREATED, Json(resp)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.checkout_service.get(order_id).await {
        Ok(order) => (axum::http::StatusCode::OK, Json(order)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}
