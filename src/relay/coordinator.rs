use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{AuthService, CredentialSink, ForwardRequest, ForwardResponse, RelayError, RelayTransport};

/// How concurrent requests that all hit an expired credential share a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// Each request that sees 401/403 runs its own refresh.
    #[default]
    Independent,
    /// Requests wait on one in-flight refresh and skip theirs when it already
    /// replaced the credential they failed with.
    ///
    /// A request that started before a concurrent refresh finished counts it
    /// as its own, even if it already sent the new credential. It then replays
    /// once with the current credential and never refreshes a second time.
    SingleFlight,
}

impl FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(Self::Independent),
            "single-flight" | "single_flight" | "singleflight" => Ok(Self::SingleFlight),
            other => Err(format!("unknown refresh policy '{}'", other)),
        }
    }
}

/// How a request left the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// First response was not 401/403 and was returned as-is.
    Passed,
    /// Credential was refreshed and the request replayed once.
    Retried,
    /// Refresh failed, logout was issued, and the original 401/403 returned.
    LoggedOut,
}

/// Object-safe view of a coordinator, for callers that don't care about its parts.
#[async_trait]
pub trait RecoveringRelay: Send + Sync {
    async fn execute_with_outcome(&self, request: &ForwardRequest) -> (ForwardResponse, RecoveryOutcome);

    async fn execute(&self, request: &ForwardRequest) -> ForwardResponse {
        self.execute_with_outcome(request).await.0
    }
}

/// Wraps a transport and recovers from one credential expiry per request.
pub struct Coordinator<T, A, S> {
    transport: T,
    auth: A,
    sink: S,
    policy: RefreshPolicy,
    refresh_gate: Mutex<()>,
    refresh_epoch: AtomicU64,
}

impl<T, A, S> Coordinator<T, A, S>
where
    T: RelayTransport,
    A: AuthService,
    S: CredentialSink,
{
    pub fn new(transport: T, auth: A, sink: S) -> Self {
        Self {
            transport,
            auth,
            sink,
            policy: RefreshPolicy::default(),
            refresh_gate: Mutex::new(()),
            refresh_epoch: AtomicU64::new(0),
        }
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn run(&self, request: &ForwardRequest) -> (ForwardResponse, RecoveryOutcome) {
        let observed_epoch = self.refresh_epoch.load(Ordering::Acquire);

        let first = self.transport.send(request).await;
        if !first.is_auth_failure() {
            return (first, RecoveryOutcome::Passed);
        }

        tracing::info!(
            "{} {} answered {}, refreshing credential",
            request.method.http_method(),
            request.path,
            first.status
        );

        match self.recover(observed_epoch).await {
            Ok(()) => {
                let retried = self.transport.send(request).await;
                tracing::debug!(
                    "Replayed {} {} -> {}",
                    request.method.http_method(),
                    request.path,
                    retried.status
                );
                (retried, RecoveryOutcome::Retried)
            }
            Err(e) => {
                tracing::warn!("Credential refresh failed: {}", e);
                if let Err(e) = self.auth.logout().await {
                    tracing::warn!("Logout after failed refresh did not complete: {}", e);
                }
                (first, RecoveryOutcome::LoggedOut)
            }
        }
    }

    async fn recover(&self, observed_epoch: u64) -> Result<(), RelayError> {
        match self.policy {
            RefreshPolicy::Independent => self.refresh_now().await,
            RefreshPolicy::SingleFlight => {
                let _guard = self.refresh_gate.lock().await;
                if self.refresh_epoch.load(Ordering::Acquire) != observed_epoch {
                    tracing::debug!("Credential already refreshed by a concurrent request");
                    return Ok(());
                }
                self.refresh_now().await
            }
        }
    }

    async fn refresh_now(&self) -> Result<(), RelayError> {
        let credential = self.auth.refresh().await?;
        self.sink.set_credential(credential);
        self.refresh_epoch.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

#[async_trait]
impl<T, A, S> RecoveringRelay for Coordinator<T, A, S>
where
    T: RelayTransport,
    A: AuthService,
    S: CredentialSink,
{
    async fn execute_with_outcome(&self, request: &ForwardRequest) -> (ForwardResponse, RecoveryOutcome) {
        self.run(request).await
    }
}
