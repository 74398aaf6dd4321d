use crate::signaling::SignalingService;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use beacon_core::PeerId;

/// `GET /peers`: ids of the currently connected peers.
pub async fn peers_handler(State(service): State<SignalingService>) -> Json<Vec<PeerId>> {
    Json(service.peers())
}

/// `OPTIONS /peers`: preflight, empty body.
pub async fn peers_preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn health_handler() -> &'static str {
    "OK"
}
