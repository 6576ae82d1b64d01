use std::sync::Arc;

use tracing::warn;

use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// Transient key holding the reason for the last forced logout.
pub const FORCED_LOGOUT_MESSAGE_KEY: &str = "jobboard:forced-logout-message";

/// One pending "you were logged out because..." message, read once.
#[derive(Clone)]
pub struct ForcedLogoutSlot {
    store: Arc<dyn KeyValueStore>,
}

impl ForcedLogoutSlot {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Record `message`, replacing any pending one.
    pub fn store(&self, message: &str) -> Result<(), StorageError> {
        self.store.set(FORCED_LOGOUT_MESSAGE_KEY, message)
    }

    pub fn peek(&self) -> Option<String> {
        self.store.get(FORCED_LOGOUT_MESSAGE_KEY).ok().flatten()
    }

    /// Return the pending message and clear it.
    pub fn take(&self) -> Option<String> {
        let message = self.peek()?;
        if let Err(e) = self.store.remove(FORCED_LOGOUT_MESSAGE_KEY) {
            warn!(error = %e, "Failed to clear forced logout message");
        }
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn take_consumes_message() {
        let slot = ForcedLogoutSlot::new(Arc::new(MemoryStore::new()));
        assert_eq!(slot.take(), None);

        slot.store("expired").unwrap();
        assert_eq!(slot.peek().as_deref(), Some("expired"));
        assert_eq!(slot.take().as_deref(), Some("expired"));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn last_writer_wins() {
        let slot = ForcedLogoutSlot::new(Arc::new(MemoryStore::new()));
        slot.store("first").unwrap();
        slot.store("second").unwrap();
        assert_eq!(slot.take().as_deref(), Some("second"));
    }
}
