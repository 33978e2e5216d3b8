// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::Arc;

use kodama_infrastructure::{load_versioned, save_versioned, LoadOutcome, StateStorage};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener<T> = Box<dyn Fn(&Arc<T>) + Send + Sync>;

/// A single immutable value persisted under a versioned key.
///
/// The value is swapped wholesale on every change: readers that took a snapshot
/// keep seeing it unchanged. Each change is written to storage and then
/// broadcast to listeners.
pub(crate) struct PersistedCell<T> {
    current: Arc<T>,
    storage: Arc<dyn StateStorage>,
    key: String,
    version: u32,
    restored: bool,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_subscription: u64,
}

impl<T> PersistedCell<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub(crate) fn open(storage: Arc<dyn StateStorage>, key: String, version: u32) -> Self {
        let outcome: LoadOutcome<T> = load_versioned(storage.as_ref(), &key, version);
        let restored = outcome.is_restored();
        info!(target: "store", key = %key, restored, "persisted state opened");

        Self {
            current: Arc::new(outcome.into_state()),
            storage,
            key,
            version,
            restored,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub(crate) fn get(&self) -> &Arc<T> {
        &self.current
    }

    pub(crate) fn was_restored(&self) -> bool {
        self.restored
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn replace(&mut self, next: T) {
        self.current = Arc::new(next);

        if let Err(e) = save_versioned(self.storage.as_ref(), &self.key, self.version, &*self.current) {
            warn!(target: "store", key = %self.key, error = %e, "failed to persist state");
        }

        for (_, listener) in &self.listeners {
            listener(&self.current);
        }
    }

    pub(crate) fn subscribe(&mut self, listener: Listener<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }
}
