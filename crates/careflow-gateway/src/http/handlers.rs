use crate::gateway::Gateway;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// `POST /analyze-patient`
///
/// Always answers with a renderable analysis; total failures use status 500.
pub async fn analyze(State(gateway): State<Gateway>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    let response = gateway
        .respond_to_body(&body)
        .instrument(info_span!("analyze_request", %request_id))
        .await;

    let status = if response.is_failure() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    (status, Json(response)).into_response()
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
