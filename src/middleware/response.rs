use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;

use crate::error::ApiError;

/// `{"success": true, "data": ...}` envelope for bodies the gateway builds
/// itself. Relayed downstream bodies are never wrapped.
#[derive(Debug)]
pub struct ApiResponse<T>(pub T);

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self(data)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self.0) {
            Ok(data) => Json(json!({ "success": true, "data": data })).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize gateway response: {}", e);
                ApiError::internal_server_error("Failed to serialize response").into_response()
            }
        }
    }
}
