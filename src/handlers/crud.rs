use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::RequestSession;
use crate::relay::ForwardRequest;
use crate::server::AppState;
use crate::types::{CreateCar, UpdateCar};

/// POST /api/crud/create - create a car listing on the inventory service
pub async fn create_car(
    State(state): State<AppState>,
    session: RequestSession,
    payload: Result<Json<CreateCar>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(car) = payload.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    tracing::debug!("Creating car {} {} ({})", car.make, car.model, car.year);

    forward_car(&state, &session, json_request(ForwardRequest::post_json("cars", &car))?, "Create failed").await
}

/// PUT /api/crud/update-car/:car_id - replace a car listing
pub async fn update_car(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
    session: RequestSession,
    payload: Result<Json<UpdateCar>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(car) = payload.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    let path = format!("cars/{}", car_id);

    forward_car(&state, &session, json_request(ForwardRequest::put_json(&path, &car))?, "Failed to update").await
}

async fn forward_car(
    state: &AppState,
    session: &RequestSession,
    request: ForwardRequest,
    fallback: &str,
) -> Result<Response, ApiError> {
    let response = state.cars.forward(session, &request).await;

    if response.is_success() {
        return Ok(response.into_response());
    }

    // Error bodies are reduced to the downstream message
    let message = response.message().unwrap_or(fallback).to_string();
    tracing::info!("Car service answered {} for {}: {}", response.status, request.path, message);
    Ok((response.status, Json(json!({ "message": message }))).into_response())
}

fn json_request(result: Result<ForwardRequest, serde_json::Error>) -> Result<ForwardRequest, ApiError> {
    result.map_err(|e| {
        tracing::error!("Failed to encode car payload: {}", e);
        ApiError::internal_server_error("Failed to encode request")
    })
}
