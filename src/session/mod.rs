//! Session lifecycle: the persisted credential, the forced-logout message,
//! and the in-memory context the rest of the application reads.

mod forced_logout;
mod store;

pub use forced_logout::{FORCED_LOGOUT_MESSAGE_KEY, ForcedLogoutSlot};
pub use store::{AUTH_STORAGE_KEY, SessionStore};

use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::StorageError;
use crate::events::{AuthEvents, AuthInvalidated, Subscription};
use crate::models::Credential;

struct SessionState {
    store: SessionStore,
    forced_logout: ForcedLogoutSlot,
    credential: watch::Sender<Option<Credential>>,
}

impl SessionState {
    fn set(&self, credential: Option<Credential>) -> Result<(), StorageError> {
        self.credential.send_replace(credential.clone());
        self.store.save(credential.as_ref())
    }

    fn on_invalidated(&self, event: &AuthInvalidated) {
        let pending = event.detail.as_deref().filter(|d| !d.is_empty());
        if let Some(detail) = pending.filter(|_| !event.recorded) {
            if let Err(e) = self.forced_logout.store(detail) {
                warn!(error = %e, "Failed to record forced logout message");
            }
        }
        info!("Session invalidated by server, logging out");
        if let Err(e) = self.set(None) {
            warn!(error = %e, "Failed to clear stored credential");
        }
    }
}

/// The single authenticated identity of this client.
///
/// Loaded once from the [`SessionStore`] at construction and kept in sync
/// with it. Listens on [`AuthEvents`] for as long as it lives, so a 401 from
/// any request clears it; dropping it unsubscribes.
pub struct SessionContext {
    state: Arc<SessionState>,
    _subscription: Subscription,
}

impl SessionContext {
    pub fn new(store: SessionStore, forced_logout: ForcedLogoutSlot, events: &AuthEvents) -> Self {
        let initial = store.load();
        let (credential, _) = watch::channel(initial);
        let state = Arc::new(SessionState {
            store,
            forced_logout,
            credential,
        });

        let weak: Weak<SessionState> = Arc::downgrade(&state);
        let subscription = events.subscribe(move |event| {
            if let Some(state) = weak.upgrade() {
                state.on_invalidated(event);
            }
        });

        Self {
            state,
            _subscription: subscription,
        }
    }

    pub fn credential(&self) -> Option<Credential> {
        self.state.credential.borrow().clone()
    }

    /// True iff a non-empty token is present.
    pub fn is_authenticated(&self) -> bool {
        self.state
            .credential
            .borrow()
            .as_ref()
            .is_some_and(|c| !c.token.is_empty())
    }

    /// Replace the credential in memory, then persist it.
    pub fn set_auth(&self, credential: Credential) -> Result<(), StorageError> {
        info!(cluster_id = %credential.cluster_id, "Session established");
        self.state.set(Some(credential))
    }

    /// Clear the credential in memory and in storage.
    pub fn logout(&self) -> Result<(), StorageError> {
        info!("Logging out");
        self.state.set(None)
    }

    /// Observe credential changes.
    pub fn watch(&self) -> watch::Receiver<Option<Credential>> {
        self.state.credential.subscribe()
    }

    /// Consume the reason for the last forced logout, if one is pending.
    pub fn take_forced_logout_message(&self) -> Option<String> {
        self.state.forced_logout.take()
    }
}
