use axum::{extract::State, response::Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::RequestSession;
use crate::relay::{AmbientSession, AuthService, HttpAuthService, RefreshResponse, RelayError};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
struct RefreshBody {
    #[serde(rename = "refreshToken", alias = "refresh_token")]
    refresh_token: Option<String>,
}

/// GET|POST /api/refresh - renew the access credential
///
/// The refresh credential comes from the refresh-token cookie or, failing
/// that, a `{"refreshToken": ...}` body. It is exchanged at the identity
/// provider. The new access credential is set as a cookie and also returned
/// as `{"accessToken", "refreshToken"?}`.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    session: RequestSession,
    body: String,
) -> Result<(CookieJar, Json<RefreshResponse>), ApiError> {
    let settings = &state.config.session;

    let refresh_token = session
        .refresh_token()
        .map(str::to_string)
        .or_else(|| {
            serde_json::from_str::<RefreshBody>(&body)
                .ok()
                .and_then(|b| b.refresh_token)
        })
        .filter(|t| !t.is_empty())
        .ok_or(RelayError::MissingRefreshCredential)?;

    let refresh_url = settings
        .identity_refresh_url
        .as_deref()
        .ok_or(RelayError::NotConfigured("identity refresh url"))?;

    let service = HttpAuthService::new(
        state.http.clone(),
        AmbientSession {
            cookie_header: session.cookie_header().map(str::to_string),
            refresh_token: Some(refresh_token),
        },
    )
    .with_refresh_url(refresh_url)?;

    let refreshed = service.exchange().await?;
    tracing::info!("Session credential refreshed");

    let mut jar = jar.add(session_cookie(
        &settings.access_token_cookie,
        &refreshed.access_token,
        settings.secure_cookies,
    ));
    if let Some(rotated) = &refreshed.refresh_token {
        jar = jar.add(session_cookie(&settings.refresh_token_cookie, rotated, settings.secure_cookies));
    }

    Ok((jar, Json(refreshed)))
}

/// POST /api/logout - end the session
///
/// Tells the identity provider when one is configured (best-effort), then
/// clears the session cookies. Always succeeds.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    session: RequestSession,
) -> (CookieJar, Json<Value>) {
    let settings = &state.config.session;

    if let Some(logout_url) = settings.identity_logout_url.as_deref() {
        let ambient = AmbientSession {
            cookie_header: session.cookie_header().map(str::to_string),
            refresh_token: session.refresh_token().map(str::to_string),
        };
        let result = match HttpAuthService::new(state.http.clone(), ambient).with_logout_url(logout_url) {
            Ok(service) => service.logout().await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!("Identity provider logout failed: {}", e);
        }
    }

    let jar = jar
        .remove(removal_cookie(&settings.access_token_cookie))
        .remove(removal_cookie(&settings.refresh_token_cookie));

    (jar, Json(json!({ "message": "Logged out" })))
}

fn session_cookie(name: &str, value: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

fn removal_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), "")).path("/").build()
}
