#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use autobank_gateway::config::AppConfig;
use autobank_gateway::server::{app, AppState};
use axum::{
    extract::{OriginalUri, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::Value;

/// One request as the mock downstream saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: Method,
    pub path_and_query: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub cookie: Option<String>,
    pub body: String,
}

impl RecordedCall {
    pub fn path(&self) -> &str {
        self.path_and_query.split('?').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
enum ReplyBody {
    Json(Value),
    Text(String),
    RawJson(String),
}

/// What the mock answers, optionally after a delay.
#[derive(Debug, Clone)]
pub struct MockReply {
    status: StatusCode,
    body: ReplyBody,
    delay: Option<Duration>,
}

impl MockReply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: ReplyBody::Json(body),
            delay: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: ReplyBody::Text(body.to_string()),
            delay: None,
        }
    }

    /// `body` sent verbatim under a JSON content type, valid or not.
    pub fn raw_json(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: ReplyBody::RawJson(body.to_string()),
            delay: None,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Responder = Arc<dyn Fn(&RecordedCall) -> MockReply + Send + Sync>;

#[derive(Clone)]
struct MockState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    responder: Responder,
}

/// In-process downstream service that records every call it receives.
pub struct MockDownstream {
    pub origin: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockDownstream {
    pub async fn start<F>(responder: F) -> Result<Self>
    where
        F: Fn(&RecordedCall) -> MockReply + Send + Sync + 'static,
    {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;

        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            calls: calls.clone(),
            responder: Arc::new(responder),
        };
        let router = Router::new().fallback(record_and_reply).with_state(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            origin: format!("http://127.0.0.1:{}", port),
            calls,
        })
    }

    /// Absolute URL on the mock for the given path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|c| c.path() == path).count()
    }
}

async fn record_and_reply(
    State(state): State<MockState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let call = RecordedCall {
        method,
        path_and_query: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        cookie: header_value(header::COOKIE),
        body,
    };

    let reply = (state.responder)(&call);
    state.calls.lock().expect("calls lock").push(call);

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    match reply.body {
        ReplyBody::Json(value) => (reply.status, Json(value)).into_response(),
        ReplyBody::Text(text) => (reply.status, [(header::CONTENT_TYPE, "text/plain")], text).into_response(),
        ReplyBody::RawJson(text) => (reply.status, [(header::CONTENT_TYPE, "application/json")], text).into_response(),
    }
}

/// A port nothing listens on.
pub fn unreachable_origin() -> String {
    let port = portpicker::pick_unused_port().expect("free port");
    format!("http://127.0.0.1:{}", port)
}

/// Gateway config pointing both relays and the identity endpoints at `mock`.
pub fn gateway_config(mock: &MockDownstream) -> AppConfig {
    let mut config = AppConfig::development();
    config.relay.banking_base_url = mock.url("/api/v1");
    config.relay.car_base_url = mock.url("/car");
    config.session.identity_refresh_url = Some(mock.url("/identity/refresh"));
    config.session.identity_logout_url = Some(mock.url("/identity/logout"));
    config.api.enable_request_logging = false;
    config
}

/// Serve the gateway on a free port and return its base URL.
pub async fn spawn_gateway(config: AppConfig) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let router = app(AppState::from_config(config)?);

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(format!("http://127.0.0.1:{}", port))
}
