//! Session event source
//!
//! The identity provider signals sign-in and sign-out; interested parts of the
//! application subscribe with a callback and get a handle that cancels the
//! subscription explicitly or when dropped.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use contracts::system::auth::SessionUser;

type Listener = Arc<dyn Fn(Option<&SessionUser>) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
    current: Option<SessionUser>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // A panicking listener never runs under the lock, so the state stays consistent
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Source of session changes (`Some(user)` on sign-in, `None` on sign-out)
#[derive(Clone, Default)]
pub struct SessionEvents {
    registry: Arc<Mutex<Registry>>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it is called at once with the current session
    pub fn subscribe<F>(&self, callback: F) -> SessionSubscription
    where
        F: Fn(Option<&SessionUser>) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(callback);
        let (id, current) = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.insert(id, listener.clone());
            (id, registry.current.clone())
        };
        listener(current.as_ref());
        SessionSubscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Record the new session and notify every listener
    pub fn publish(&self, user: Option<SessionUser>) {
        let listeners: Vec<Listener> = {
            let mut registry = lock(&self.registry);
            registry.current = user.clone();
            registry.listeners.values().cloned().collect()
        };
        match &user {
            Some(u) => tracing::info!(user_id = %u.user_id, listeners = listeners.len(), "Session started"),
            None => tracing::info!(listeners = listeners.len(), "Session ended"),
        }
        for listener in listeners {
            listener(user.as_ref());
        }
    }

    pub fn current(&self) -> Option<SessionUser> {
        lock(&self.registry).current.clone()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

/// Cancellation handle of a session listener
#[must_use = "dropping the subscription cancels it"]
pub struct SessionSubscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl SessionSubscription {
    pub fn cancel(self) {}

    /// Keep the listener for the lifetime of the event source
    pub fn detach(self) {
        std::mem::forget(self);
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).listeners.remove(&self.id);
        }
    }
}
