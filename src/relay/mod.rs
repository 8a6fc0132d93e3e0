//! Authenticated forwarding relay.
//!
//! The [`Dispatcher`] gates each request on a session credential and
//! forwards it to one downstream base address. The [`Coordinator`] sits in
//! front of it on the caller's side. When a response comes back 401/403 it
//! refreshes the credential once, stores it, and replays the request.

pub mod auth_client;
pub mod coordinator;
pub mod credential;
pub mod dispatcher;
pub mod error;
pub mod request;
pub mod response;

pub use auth_client::{AmbientSession, AuthService, HttpAuthService, RefreshResponse};
pub use coordinator::{Coordinator, RecoveringRelay, RecoveryOutcome, RefreshPolicy};
pub use credential::{CredentialSink, CredentialStore, SessionCredential, SessionLookup};
pub use dispatcher::{http_client, Dispatcher, RelayTransport, SessionBoundTransport};
pub use error::RelayError;
pub use request::{ForwardMethod, ForwardPath, ForwardRequest};
pub use response::{ForwardBody, ForwardResponse};
