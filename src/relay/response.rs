use axum::{
    http::header,
    response::{IntoResponse, Json, Response},
};
use reqwest::StatusCode;
use serde_json::Value;

use super::RelayError;
use crate::error::ApiError;

/// Body of a forwarded response, decided by the downstream content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardBody {
    Json(Value),
    Raw(String),
}

/// Normalized reply handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardResponse {
    pub status: StatusCode,
    pub body: ForwardBody,
}

impl ForwardResponse {
    pub fn new(status: StatusCode, body: ForwardBody) -> Self {
        Self { status, body }
    }

    /// Rejection for a caller without a credential. Produced before any network call.
    pub fn unauthorized() -> Self {
        ApiError::unauthorized("Unauthorized").into()
    }

    pub fn gateway_failure() -> Self {
        ApiError::gateway_failure().into()
    }

    /// 401 and 403 are the only statuses treated as an expired credential.
    pub fn is_auth_failure(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED || self.status == StatusCode::FORBIDDEN
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ForwardBody::Json(value) => Some(value),
            ForwardBody::Raw(_) => None,
        }
    }

    /// The `message` field downstream services put on error bodies.
    pub fn message(&self) -> Option<&str> {
        self.json()
            .and_then(|value| value.get("message"))
            .and_then(Value::as_str)
    }

    /// Read a downstream response, parsing the body as JSON when the content type says so.
    pub async fn from_downstream(response: reqwest::Response) -> Result<Self, RelayError> {
        let status = response.status();
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        let body = if is_json {
            ForwardBody::Json(response.json::<Value>().await?)
        } else {
            ForwardBody::Raw(response.text().await?)
        };

        Ok(Self::new(status, body))
    }
}

impl From<ApiError> for ForwardResponse {
    fn from(err: ApiError) -> Self {
        Self::new(err.status(), ForwardBody::Json(err.to_json()))
    }
}

impl IntoResponse for ForwardResponse {
    fn into_response(self) -> Response {
        match self.body {
            ForwardBody::Json(value) => (self.status, Json(value)).into_response(),
            ForwardBody::Raw(text) => (
                self.status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                text,
            )
                .into_response(),
        }
    }
}
