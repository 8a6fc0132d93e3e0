use std::fmt;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use super::{RelayError, SessionCredential};

/// Credential renewal and logout, as seen by the coordinator.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange the stored refresh credential for a new session credential.
    async fn refresh(&self) -> Result<SessionCredential, RelayError>;

    /// End the session. Callers treat this as best-effort.
    async fn logout(&self) -> Result<(), RelayError>;
}

#[async_trait]
impl<T: AuthService + ?Sized> AuthService for Arc<T> {
    async fn refresh(&self) -> Result<SessionCredential, RelayError> {
        (**self).refresh().await
    }

    async fn logout(&self) -> Result<(), RelayError> {
        (**self).logout().await
    }
}

/// Body returned by a refresh endpoint. The access token may arrive as
/// `accessToken`, `token` or `access_token`; the first non-empty one wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawRefreshBody")]
pub struct RefreshResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken", skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct RawRefreshBody {
    #[serde(rename = "accessToken", default)]
    access_token_camel: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(rename = "access_token", default)]
    access_token_snake: Option<String>,
    #[serde(rename = "refreshToken", default)]
    refresh_token_camel: Option<String>,
    #[serde(rename = "refresh_token", default)]
    refresh_token_snake: Option<String>,
}

fn first_non_empty(candidates: [Option<String>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

impl TryFrom<RawRefreshBody> for RefreshResponse {
    type Error = String;

    fn try_from(raw: RawRefreshBody) -> Result<Self, Self::Error> {
        let access_token = first_non_empty([raw.access_token_camel, raw.token, raw.access_token_snake])
            .ok_or_else(|| "refresh body has no access token".to_string())?;
        let refresh_token = first_non_empty([raw.refresh_token_camel, raw.refresh_token_snake, None]);
        Ok(Self {
            access_token,
            refresh_token,
        })
    }
}

/// Cookies and refresh credential that travel with refresh/logout calls.
#[derive(Clone, Default)]
pub struct AmbientSession {
    pub cookie_header: Option<String>,
    pub refresh_token: Option<String>,
}

impl fmt::Debug for AmbientSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmbientSession")
            .field("cookies", &self.cookie_header.is_some())
            .field("refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

/// `AuthService` over HTTP. Holds the refresh credential and rotates it
/// whenever the refresh endpoint hands out a new one.
#[derive(Debug)]
pub struct HttpAuthService {
    http: reqwest::Client,
    refresh_url: Option<Url>,
    logout_url: Option<Url>,
    ambient: RwLock<AmbientSession>,
}

impl HttpAuthService {
    pub fn new(http: reqwest::Client, ambient: AmbientSession) -> Self {
        Self {
            http,
            refresh_url: None,
            logout_url: None,
            ambient: RwLock::new(ambient),
        }
    }

    pub fn with_refresh_url(mut self, url: &str) -> Result<Self, RelayError> {
        self.refresh_url = Some(parse_url(url)?);
        Ok(self)
    }

    pub fn with_logout_url(mut self, url: &str) -> Result<Self, RelayError> {
        self.logout_url = Some(parse_url(url)?);
        Ok(self)
    }

    pub fn ambient(&self) -> AmbientSession {
        self.ambient
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// POST the refresh credential and return the full refresh body.
    pub async fn exchange(&self) -> Result<RefreshResponse, RelayError> {
        let url = self
            .refresh_url
            .clone()
            .ok_or(RelayError::NotConfigured("refresh endpoint"))?;
        let ambient = self.ambient();

        let mut request = self.http.post(url);
        if let Some(cookies) = &ambient.cookie_header {
            request = request.header(header::COOKIE, HeaderValue::from_str(cookies)?);
        }
        if let Some(refresh_token) = &ambient.refresh_token {
            request = request.json(&json!({ "refreshToken": refresh_token }));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::RefreshRejected {
                status: status.as_u16(),
            });
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| RelayError::MalformedRefresh(e.to_string()))?;
        if body.access_token.trim().is_empty() {
            return Err(RelayError::MalformedRefresh("empty access token".to_string()));
        }

        if let Some(rotated) = body.refresh_token.clone().filter(|t| !t.is_empty()) {
            self.ambient
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .refresh_token = Some(rotated);
        }

        Ok(body)
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn refresh(&self) -> Result<SessionCredential, RelayError> {
        let body = self.exchange().await?;
        SessionCredential::new(body.access_token)
            .ok_or_else(|| RelayError::MalformedRefresh("empty access token".to_string()))
    }

    async fn logout(&self) -> Result<(), RelayError> {
        let Some(url) = self.logout_url.clone() else {
            tracing::debug!("No logout endpoint configured, skipping");
            return Ok(());
        };

        let mut request = self.http.post(url);
        if let Some(cookies) = &self.ambient().cookie_header {
            request = request.header(header::COOKIE, HeaderValue::from_str(cookies)?);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(RelayError::LogoutRejected {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

fn parse_url(raw: &str) -> Result<Url, RelayError> {
    Url::parse(raw).map_err(|e| RelayError::InvalidBaseUrl(format!("{}: {}", raw, e)))
}
