use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub token: Option<String>,
}

/// Body is taken raw so that a payload the provider garbles still gets the
/// acknowledgement instead of an extractor rejection.
pub async fn mpesa_callback(
    State(state): State<AppState>,
    query: Option<Query<CallbackQuery>>,
    body: Bytes,
) -> impl IntoResponse {
    let token = query.and_then(|Query(q)| q.token);
    let ack = state.callback_service.receive(token, body).await;
    (axum::http::StatusCode::OK, Json(ack))
}
