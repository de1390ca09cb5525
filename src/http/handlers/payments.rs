use crate::domain::payment::StkPushRequest;
use crate::service::payment_service::InitiationFailure;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn initiate_stk_push(
    State(state): State<AppState>,
    payload: Result<Json<StkPushRequest>, JsonRejection>,
) -> impl IntoResponse {
    let result = match payload {
        Ok(Json(req)) => state.payment_service.initiate(req).await,
        Err(rejection) => {
            let details = rejection.body_text();
            tracing::error!(status = %rejection.status(), "unreadable stk push request: {}", details);
            Err(InitiationFailure::Internal(details))
        }
    };

    match result {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(failure) => (failure.status(), Json(failure.body())).into_response(),
    }
}

pub async fn preflight() -> impl IntoResponse {
    axum::http::StatusCode::OK
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        axum::http::StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({"error": "Method not allowed"})),
    )
}

pub async fn health() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}
