//! Response Envelope
//! Mission: Keep every success payload in the shared `{success, message, data}` shape

use axum::Json;
use serde::Serialize;

/// Standard success envelope; `data` is `null` for message-only responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
        })
    }
}

impl ApiResponse<()> {
    /// Success with no payload (`data: null` on the wire)
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Self::ok(message, ())
    }
}
