use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::ApiResponse;

pub async fn root() -> ApiResponse<Value> {
    let version = env!("CARGO_PKG_VERSION");

    ApiResponse::success(json!({
        "name": "Autobank Gateway",
        "version": version,
        "description": "Backend-for-frontend relay for the car inventory and banking APIs",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "proxy": "/api/proxy/*path (session credential required)",
            "crud": "/api/crud/create, /api/crud/update-car/:car_id (session credential required)",
            "session": "/api/refresh, /api/logout",
        }
    }))
}

pub async fn health() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
