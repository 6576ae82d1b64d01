use std::sync::Arc;

use tracing::debug;

use crate::error::StorageError;
use crate::models::Credential;
use crate::storage::KeyValueStore;

/// Durable key holding the serialized credential.
pub const AUTH_STORAGE_KEY: &str = "jobboard_auth";

/// Persisted mirror of the last known credential.
///
/// Knows nothing about expiry. Only [`super::SessionContext`] writes to it.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the stored credential. Absent, unreadable, or mis-shaped data all
    /// yield `None`.
    pub fn load(&self) -> Option<Credential> {
        let raw = match self.store.get(AUTH_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(error = %e, "Could not read stored credential");
                return None;
            }
        };

        match serde_json::from_str::<Credential>(&raw) {
            Ok(credential) => Some(credential),
            Err(e) => {
                debug!(error = %e, "Ignoring malformed stored credential");
                None
            }
        }
    }

    /// Overwrite the stored credential, or remove it for `None`.
    pub fn save(&self, credential: Option<&Credential>) -> Result<(), StorageError> {
        match credential {
            None => self.store.remove(AUTH_STORAGE_KEY),
            Some(credential) => {
                let raw = serde_json::to_string(credential).map_err(|source| {
                    StorageError::Serialize {
                        key: AUTH_STORAGE_KEY.to_string(),
                        source,
                    }
                })?;
                self.store.set(AUTH_STORAGE_KEY, &raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};

    fn memory_store() -> (Arc<MemoryStore>, SessionStore) {
        let backing = Arc::new(MemoryStore::new());
        let store = SessionStore::new(backing.clone());
        (backing, store)
    }

    #[test]
    fn round_trips_credentials() {
        let (_, store) = memory_store();
        for (cluster, token) in [("c1", "tok"), ("", ""), ("クラスタ", "a.b.c"), ("c \"q\"", "t\n")] {
            let credential = Credential::new(cluster, token);
            store.save(Some(&credential)).unwrap();
            assert_eq!(store.load(), Some(credential));
        }
    }

    #[test]
    fn save_none_removes_entry() {
        let (backing, store) = memory_store();
        store.save(Some(&Credential::new("c1", "tok"))).unwrap();
        store.save(None).unwrap();
        assert_eq!(backing.get(AUTH_STORAGE_KEY).unwrap(), None);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn load_tolerates_bad_content() {
        let (backing, store) = memory_store();
        assert_eq!(store.load(), None);

        for raw in [
            "",
            "not json",
            "null",
            "[]",
            "\"token\"",
            r#"{"clusterId":"c1"}"#,
            r#"{"token":"t"}"#,
            r#"{"clusterId":1,"token":"t"}"#,
            r#"{"clusterId":"c1","token":null}"#,
        ] {
            backing.set(AUTH_STORAGE_KEY, raw).unwrap();
            assert_eq!(store.load(), None, "content: {}", raw);
        }
    }

    #[test]
    fn load_ignores_extra_fields() {
        let (backing, store) = memory_store();
        backing
            .set(AUTH_STORAGE_KEY, r#"{"clusterId":"c1","token":"t","extra":true}"#)
            .unwrap();
        assert_eq!(store.load(), Some(Credential::new("c1", "t")));
    }

    #[test]
    fn persists_across_file_store_instances() {
        let dir = tempfile::tempdir().unwrap();
        let credential = Credential::new("c1", "tok");

        SessionStore::new(Arc::new(FileStore::new(dir.path())))
            .save(Some(&credential))
            .unwrap();

        let reopened = SessionStore::new(Arc::new(FileStore::new(dir.path())));
        assert_eq!(reopened.load(), Some(credential));
    }
}
