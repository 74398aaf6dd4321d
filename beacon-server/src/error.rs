use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use beacon_core::InvalidPeerId;
use thiserror::Error;

/// Errors surfaced by the relay.
///
/// Every variant is scoped to a single connection or a single message; none
/// of them is fatal to the process.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Empty or missing peer id at join time.
    #[error("Invalid peer identifier: {0}")]
    InvalidIdentifier(#[from] InvalidPeerId),

    /// Malformed signaling frame.
    #[error("Failed to parse frame: {0}")]
    ParseFailure(#[from] serde_json::Error),

    /// Send or receive failure on a peer connection.
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            RelayError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
