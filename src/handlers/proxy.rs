use axum::{
    extract::{Path, RawQuery, State},
    http::Method,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::RequestSession;
use crate::relay::{ForwardRequest, ForwardResponse};
use crate::server::AppState;

/// `/api/proxy/*path` - forward to the banking API with the caller's credential.
///
/// The downstream status and body come back as-is. The relay only makes up
/// a 401 when the caller has no credential and a 500 when the downstream
/// call itself fails.
pub async fn relay(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    session: RequestSession,
    body: String,
) -> Result<ForwardResponse, ApiError> {
    let request = ForwardRequest::from_parts(&method, &path, query, body)?;

    let span = tracing::info_span!("relay", id = %Uuid::new_v4(), method = %method, path = %request.path);
    Ok(state.banking.forward(&session, &request).instrument(span).await)
}
