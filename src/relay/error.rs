use thiserror::Error;

/// Failures inside the relay. None of these are shown to callers verbatim;
/// see `From<RelayError> for ApiError`.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no session credential present")]
    MissingCredential,

    #[error("no refresh credential stored")]
    MissingRefreshCredential,

    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    #[error("credential cannot be sent as a header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("refresh rejected with status {status}")]
    RefreshRejected { status: u16 },

    #[error("logout rejected with status {status}")]
    LogoutRejected { status: u16 },

    #[error("malformed refresh response: {0}")]
    MalformedRefresh(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("method {0} cannot be relayed")]
    UnsupportedMethod(String),
}
