//! In-process broadcast of "the session is no longer valid".
//!
//! The transport publishes when the hub answers 401; the session context is
//! the subscriber. Delivery is synchronous: every listener has run by the
//! time [`AuthEvents::publish`] returns, so the session is already cleared
//! before the failing call hands its error back to the caller.
//!
//! Each bus is an explicit value handed to the transport at construction.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Name of the invalidation event, for logs.
pub const AUTH_INVALID_EVENT: &str = "jobboard:auth-invalid";

/// Payload of an invalidation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthInvalidated {
    /// Human-readable reason, shown on the next login prompt.
    pub detail: Option<String>,
    /// The publisher already wrote `detail` to the forced-logout slot.
    pub recorded: bool,
}

impl AuthInvalidated {
    /// An event whose reason still has to be recorded by the subscriber.
    pub fn new(detail: Option<String>) -> Self {
        Self {
            detail,
            recorded: false,
        }
    }
}

type Listener = Arc<dyn Fn(&AuthInvalidated) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Cloneable handle to one invalidation bus.
#[derive(Clone, Default)]
pub struct AuthEvents {
    registry: Arc<Mutex<Registry>>,
}

impl AuthEvents {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AuthInvalidated) + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }

    /// Deliver `event` to every current listener. Returns how many ran.
    pub fn publish(&self, event: &AuthInvalidated) -> usize {
        // Snapshot first so a listener may subscribe or unsubscribe without deadlocking.
        let listeners: Vec<Listener> = self
            .registry()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        tracing::debug!(
            event = AUTH_INVALID_EVENT,
            listeners = listeners.len(),
            "Publishing session invalidation"
        );

        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.registry().listeners.len()
    }
}

/// Keeps a listener registered; unsubscribes on drop.
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(|e| e.into_inner());
            registry.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
