use std::{fmt, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug)]
pub enum BridgeError {
    /// No browser extension is attached.
    NoPeer,
    /// The extension never answered a capture request.
    Timeout { request_id: String, after: Duration },
    /// The extension answered with an explicit failure.
    RemoteCapture(String),
    /// The outbound frame could not be handed to the peer connection.
    PeerSend(String),
    DuplicateRequest(String),
    InvalidPayload(String),
    Io(std::io::Error),
    Malformed(String),
}

impl BridgeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoPeer => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPeer => write!(f, "Chrome extension not connected"),
            Self::Timeout { request_id, after } => write!(
                f,
                "Screenshot capture timed out after {}ms (request {request_id})",
                after.as_millis()
            ),
            Self::RemoteCapture(msg) => write!(f, "{msg}"),
            Self::PeerSend(msg) => write!(f, "Extension connection lost: {msg}"),
            Self::DuplicateRequest(id) => write!(f, "Request id {id} is already outstanding"),
            Self::InvalidPayload(msg) => write!(f, "Invalid screenshot payload: {msg}"),
            Self::Io(e) => write!(f, "Failed to save screenshot: {e}"),
            Self::Malformed(msg) => write!(f, "Malformed extension message: {msg}"),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<base64::DecodeError> for BridgeError {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
