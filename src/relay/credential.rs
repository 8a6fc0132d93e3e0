use std::fmt;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

/// Opaque bearer token presented to downstream services.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    /// Returns `None` for blank tokens so an empty header or cookie never counts as a session.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential(<redacted>)")
    }
}

/// Resolves the caller's current credential from whatever context it was built with.
#[async_trait]
pub trait SessionLookup: Send + Sync {
    async fn current_credential(&self) -> Option<SessionCredential>;
}

/// Write side of the credential store. The refresh path is its only user.
pub trait CredentialSink: Send + Sync {
    fn set_credential(&self, credential: SessionCredential);
}

/// Shared holder of the current credential.
#[derive(Debug, Default)]
pub struct CredentialStore {
    current: RwLock<Option<SessionCredential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Option<SessionCredential>) -> Self {
        Self {
            current: RwLock::new(credential),
        }
    }

    pub fn current(&self) -> Option<SessionCredential> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

#[async_trait]
impl SessionLookup for CredentialStore {
    async fn current_credential(&self) -> Option<SessionCredential> {
        self.current()
    }
}

impl CredentialSink for CredentialStore {
    fn set_credential(&self, credential: SessionCredential) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential);
    }
}

#[async_trait]
impl<T: SessionLookup + ?Sized> SessionLookup for Arc<T> {
    async fn current_credential(&self) -> Option<SessionCredential> {
        (**self).current_credential().await
    }
}

impl<T: CredentialSink + ?Sized> CredentialSink for Arc<T> {
    fn set_credential(&self, credential: SessionCredential) {
        (**self).set_credential(credential)
    }
}
