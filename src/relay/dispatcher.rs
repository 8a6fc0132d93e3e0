use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use url::Url;

use super::{ForwardRequest, ForwardResponse, RelayError, SessionCredential, SessionLookup};
use crate::error::ApiError;

/// Anything that turns a forward request into a forward response.
///
/// Implementations never fail: transport problems are already folded into
/// the response (see `ForwardResponse::gateway_failure`).
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send(&self, request: &ForwardRequest) -> ForwardResponse;
}

/// Build the shared HTTP client. No timeout unless one is configured.
pub fn http_client(timeout_secs: Option<u64>) -> Result<reqwest::Client, RelayError> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Session-gated forwarder bound to one downstream base address.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    base_url: Url,
    http: reqwest::Client,
}

impl Dispatcher {
    pub fn new(base_url: &str, http: reqwest::Client) -> Result<Self, RelayError> {
        let base_url =
            Url::parse(base_url).map_err(|e| RelayError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RelayError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Gate on the caller's credential, then forward.
    ///
    /// No credential yields 401 without touching the network. Any transport
    /// or decoding failure yields a generic 500. Every other status is passed
    /// through from downstream.
    pub async fn forward<L>(&self, lookup: &L, request: &ForwardRequest) -> ForwardResponse
    where
        L: SessionLookup + ?Sized,
    {
        let Some(credential) = lookup.current_credential().await else {
            tracing::debug!("Rejecting {} {}: no session credential", request.method.http_method(), request.path);
            return ForwardResponse::unauthorized();
        };

        match self.send_with(&credential, request).await {
            Ok(response) => {
                tracing::debug!(
                    "{} {} -> {}",
                    request.method.http_method(),
                    request.path,
                    response.status
                );
                response
            }
            Err(e) => ApiError::from(e).into(),
        }
    }

    async fn send_with(
        &self,
        credential: &SessionCredential,
        request: &ForwardRequest,
    ) -> Result<ForwardResponse, RelayError> {
        let url = request.target_url(&self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&credential.bearer())?);

        let mut builder = self
            .http
            .request(request.method.http_method(), url)
            .headers(headers);
        if let Some(body) = request.method.body() {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await?;
        ForwardResponse::from_downstream(response).await
    }

    /// Pair this dispatcher with a fixed session lookup.
    pub fn bind<L: SessionLookup>(self, lookup: L) -> SessionBoundTransport<L> {
        SessionBoundTransport {
            dispatcher: self,
            lookup,
        }
    }
}

/// A dispatcher plus the session lookup it reads on every call.
#[derive(Debug, Clone)]
pub struct SessionBoundTransport<L> {
    dispatcher: Dispatcher,
    lookup: L,
}

impl<L> SessionBoundTransport<L> {
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

#[async_trait]
impl<L: SessionLookup> RelayTransport for SessionBoundTransport<L> {
    async fn send(&self, request: &ForwardRequest) -> ForwardResponse {
        self.dispatcher.forward(&self.lookup, request).await
    }
}
