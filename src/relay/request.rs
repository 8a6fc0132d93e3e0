use std::fmt;

use reqwest::Method;
use serde::Serialize;
use url::Url;

use super::RelayError;

/// Downstream path as a list of non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForwardPath(Vec<String>);

impl ForwardPath {
    /// Split `cars/42` (or `/cars//42/`) into segments, dropping empty ones.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            segments
                .into_iter()
                .map(Into::<String>::into)
                .filter(|segment| !segment.is_empty())
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ForwardPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// HTTP method of a forward request. Only the variants that may carry a body have one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardMethod {
    Get,
    Delete,
    Post(String),
    Put(String),
    Patch(String),
}

impl ForwardMethod {
    /// Map an inbound method and raw body. Bodies sent with GET or DELETE are dropped.
    pub fn from_http(method: &Method, body: String) -> Result<Self, RelayError> {
        match *method {
            Method::GET => Ok(Self::Get),
            Method::DELETE => Ok(Self::Delete),
            Method::POST => Ok(Self::Post(body)),
            Method::PUT => Ok(Self::Put(body)),
            Method::PATCH => Ok(Self::Patch(body)),
            ref other => Err(RelayError::UnsupportedMethod(other.to_string())),
        }
    }

    pub fn http_method(&self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Delete => Method::DELETE,
            Self::Post(_) => Method::POST,
            Self::Put(_) => Method::PUT,
            Self::Patch(_) => Method::PATCH,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Get | Self::Delete => None,
            Self::Post(body) | Self::Put(body) | Self::Patch(body) => Some(body),
        }
    }
}

/// One caller intent to invoke a downstream operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRequest {
    pub method: ForwardMethod,
    pub path: ForwardPath,
    pub query: Option<String>,
}

impl ForwardRequest {
    pub fn new(method: ForwardMethod, path: ForwardPath) -> Self {
        Self {
            method,
            path,
            query: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(ForwardMethod::Get, ForwardPath::parse(path))
    }

    pub fn delete(path: &str) -> Self {
        Self::new(ForwardMethod::Delete, ForwardPath::parse(path))
    }

    pub fn post_json<T: Serialize>(path: &str, body: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            ForwardMethod::Post(serde_json::to_string(body)?),
            ForwardPath::parse(path),
        ))
    }

    pub fn put_json<T: Serialize>(path: &str, body: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            ForwardMethod::Put(serde_json::to_string(body)?),
            ForwardPath::parse(path),
        ))
    }

    /// Build from the pieces of an inbound HTTP request.
    pub fn from_parts(
        method: &Method,
        raw_path: &str,
        query: Option<String>,
        body: String,
    ) -> Result<Self, RelayError> {
        Ok(Self::new(ForwardMethod::from_http(method, body)?, ForwardPath::parse(raw_path))
            .with_query(query))
    }

    /// Attach a query string, kept verbatim apart from a leading `?`.
    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query
            .map(|q| q.trim_start_matches('?').to_string())
            .filter(|q| !q.is_empty());
        self
    }

    /// `base` + path segments + query string.
    pub fn target_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(self.path.segments());
        }
        url.set_query(self.query.as_deref());
        url
    }
}
