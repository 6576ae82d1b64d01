use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{HubClient, Transport};
use crate::config::AppConfig;
use crate::events::AuthEvents;
use crate::session::{ForcedLogoutSlot, SessionContext, SessionStore};
use crate::storage::{FileStore, KeyValueStore};

/// Everything a command needs: configuration, the session, and the hub client.
///
/// The transport and the session share one [`AuthEvents`] bus, so a 401 seen
/// by any request clears the session held here.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub session: Arc<SessionContext>,
    pub client: HubClient,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Result<Self> {
        let durable: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.state_dir));
        let transient: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.runtime_dir()));

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            http = http.timeout(timeout);
        }
        let http = http.build().context("Failed to build HTTP client")?;

        Ok(Self::with_parts(config, http, durable, transient))
    }

    /// Assemble a context from explicit stores, e.g. in-memory ones.
    pub fn with_parts(
        config: AppConfig,
        http: reqwest::Client,
        durable: Arc<dyn KeyValueStore>,
        transient: Arc<dyn KeyValueStore>,
    ) -> Self {
        let events = AuthEvents::new();
        let forced_logout = ForcedLogoutSlot::new(transient);
        let session = SessionContext::new(
            SessionStore::new(durable),
            forced_logout.clone(),
            &events,
        );
        let transport = Transport::new(&config.api_base_url, http, events, forced_logout);

        Self {
            config: Arc::new(config),
            session: Arc::new(session),
            client: HubClient::new(transport),
        }
    }
}
