//! Success envelope shared by every handler.
//!
//! Payload fields are flattened next to `success` and `message`, so a
//! handler returning `ApiResponse<CategoryPayload>` produces
//! `{ "success": true, "message": "...", "category": { ... } }`.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

/// Payload for responses that only carry a message.
#[derive(Debug, Default, Serialize)]
pub struct NoData {}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

impl ApiResponse<NoData> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_message(message, NoData {})
    }
}
