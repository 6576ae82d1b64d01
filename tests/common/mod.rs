//! Shared helpers: an in-process stub hub and in-memory client wiring.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use jobboard::config::AppConfig;
use jobboard::context::AppContext;
use jobboard::error::StorageError;
use jobboard::storage::{KeyValueStore, MemoryStore};

/// Memory store that counts writes.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_hub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub struct TestClient {
    pub ctx: AppContext,
    pub durable: Arc<MemoryStore>,
    pub transient: Arc<CountingStore>,
}

pub fn client(base_url: &str) -> TestClient {
    let durable = Arc::new(MemoryStore::new());
    let transient = Arc::new(CountingStore::default());
    let config = AppConfig {
        api_base_url: base_url.to_string(),
        ..Default::default()
    };
    let ctx = AppContext::with_parts(
        config,
        reqwest::Client::new(),
        durable.clone(),
        transient.clone(),
    );

    TestClient {
        ctx,
        durable,
        transient,
    }
}

pub fn output(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf).into_owned()
}
