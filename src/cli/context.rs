use std::sync::Arc;

use crate::cli::config::{self, EndpointConfig, SessionFile};
use crate::client::RelayClient;
use crate::config::config as app_config;
use crate::relay::{
    http_client, AmbientSession, Coordinator, CredentialStore, Dispatcher, HttpAuthService, SessionCredential,
};

/// Everything a command needs to talk to the APIs with the stored session.
pub struct CliContext {
    pub endpoints: EndpointConfig,
    pub store: Arc<CredentialStore>,
    pub auth: Arc<HttpAuthService>,
    /// Car inventory API
    pub cars: RelayClient,
    /// Banking API through the gateway proxy
    pub banking: RelayClient,
}

impl CliContext {
    pub fn load() -> anyhow::Result<Self> {
        let endpoints = config::load_endpoints()?;
        let session = config::load_session()?;
        Self::build(endpoints, session)
    }

    pub fn build(endpoints: EndpointConfig, session: SessionFile) -> anyhow::Result<Self> {
        let relay = &app_config().relay;
        let http = http_client(relay.request_timeout_secs)?;

        let store = Arc::new(CredentialStore::with_credential(
            session.access_token.and_then(SessionCredential::new),
        ));
        let ambient = AmbientSession {
            cookie_header: None,
            refresh_token: session.refresh_token,
        };
        let auth = Arc::new(
            HttpAuthService::new(http.clone(), ambient)
                .with_refresh_url(&endpoints.refresh_url)?
                .with_logout_url(&endpoints.logout_url)?,
        );

        let cars = Dispatcher::new(&endpoints.cars_url, http.clone())?.bind(store.clone());
        let banking = Dispatcher::new(&endpoints.relay_url, http)?.bind(store.clone());

        Ok(Self {
            cars: RelayClient::new(
                Coordinator::new(cars, auth.clone(), store.clone()).with_policy(relay.refresh_policy),
            ),
            banking: RelayClient::new(
                Coordinator::new(banking, auth.clone(), store.clone()).with_policy(relay.refresh_policy),
            ),
            endpoints,
            store,
            auth,
        })
    }

    pub fn logged_out(&self) -> bool {
        self.cars.logged_out() || self.banking.logged_out()
    }

    /// Current credential plus the refresh token, which may have rotated.
    pub fn snapshot(&self) -> SessionFile {
        SessionFile::new(
            self.store.current().map(|c| c.as_str().to_string()),
            self.auth.ambient().refresh_token,
        )
    }

    /// Write the session back, or wipe it after a forced logout.
    pub fn persist(&self) -> anyhow::Result<()> {
        if self.logged_out() {
            tracing::info!("Session expired and could not be renewed, clearing stored credentials");
            return config::clear_session();
        }
        config::save_session(&self.snapshot())
    }
}
