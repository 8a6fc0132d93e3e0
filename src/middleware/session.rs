use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;

use crate::config::SessionConfig;
use crate::relay::{SessionCredential, SessionLookup};
use crate::server::AppState;

/// Session context of an inbound request: the bearer credential plus the
/// cookies that refresh and logout calls need.
#[derive(Debug, Clone, Default)]
pub struct RequestSession {
    credential: Option<SessionCredential>,
    refresh_token: Option<String>,
    cookie_header: Option<String>,
}

impl RequestSession {
    /// Credential comes from `Authorization: Bearer`, falling back to the access-token cookie.
    pub fn from_headers(headers: &HeaderMap, settings: &SessionConfig) -> Self {
        let jar = CookieJar::from_headers(headers);

        let credential = extract_bearer_from_headers(headers).or_else(|| {
            jar.get(&settings.access_token_cookie)
                .and_then(|c| SessionCredential::new(c.value()))
        });

        let refresh_token = jar
            .get(&settings.refresh_token_cookie)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty());

        let cookie_header = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            credential,
            refresh_token,
            cookie_header,
        }
    }

    pub fn credential(&self) -> Option<&SessionCredential> {
        self.credential.as_ref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn cookie_header(&self) -> Option<&str> {
        self.cookie_header.as_deref()
    }
}

/// Extract the bearer token from the Authorization header.
/// Anything other than a non-empty `Bearer <token>` counts as absent.
fn extract_bearer_from_headers(headers: &HeaderMap) -> Option<SessionCredential> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) => SessionCredential::new(token),
        None => {
            tracing::debug!("Ignoring Authorization header without Bearer scheme");
            None
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, &state.config.session))
    }
}

#[async_trait]
impl SessionLookup for RequestSession {
    async fn current_credential(&self) -> Option<SessionCredential> {
        self.credential.clone()
    }
}
