// SPDX-License-Identifier: GPL-3.0-or-later

//! Versioned persistence on top of [`StateStorage`].
//!
//! Values are stored as `{"state": ..., "version": N}`. Loading never fails:
//! a missing key, unreadable storage, malformed JSON or a different version
//! all collapse to [`LoadOutcome::Defaulted`]. There is no migration between
//! versions; a bump discards whatever was stored before.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{Result, StateStorage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEnvelope<T> {
    pub state: T,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome<T> {
    Restored(T),
    Defaulted,
}

impl<T> LoadOutcome<T> {
    pub fn is_restored(&self) -> bool {
        matches!(self, Self::Restored(_))
    }

    /// The restored value, or `T::default()`.
    pub fn into_state(self) -> T
    where
        T: Default,
    {
        match self {
            Self::Restored(state) => state,
            Self::Defaulted => T::default(),
        }
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

pub fn load_versioned<T: DeserializeOwned>(
    storage: &dyn StateStorage,
    key: &str,
    version: u32,
) -> LoadOutcome<T> {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(target: "storage", key, "no persisted state, using defaults");
            return LoadOutcome::Defaulted;
        }
        Err(e) => {
            warn!(target: "storage", key, error = %e, "failed to read persisted state, using defaults");
            return LoadOutcome::Defaulted;
        }
    };

    // Check the version before the payload so a schema change is reported as such.
    match serde_json::from_str::<VersionProbe>(&raw) {
        Ok(probe) if probe.version == version => {}
        Ok(probe) => {
            warn!(
                target: "storage",
                key,
                found = probe.version,
                expected = version,
                "persisted state version mismatch, discarding"
            );
            return LoadOutcome::Defaulted;
        }
        Err(e) => {
            warn!(target: "storage", key, error = %e, "malformed persisted state, discarding");
            return LoadOutcome::Defaulted;
        }
    }

    match serde_json::from_str::<PersistedEnvelope<T>>(&raw) {
        Ok(envelope) => {
            debug!(target: "storage", key, version, "persisted state restored");
            LoadOutcome::Restored(envelope.state)
        }
        Err(e) => {
            warn!(target: "storage", key, error = %e, "malformed persisted state, discarding");
            LoadOutcome::Defaulted
        }
    }
}

pub fn save_versioned<T: Serialize>(
    storage: &dyn StateStorage,
    key: &str,
    version: u32,
    state: &T,
) -> Result<()> {
    let envelope = PersistedEnvelope { state, version };
    let raw = serde_json::to_string(&envelope)?;
    storage.set_item(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        count: u32,
    }

    #[test]
    fn save_then_load_restores() {
        let storage = MemoryStorage::new();
        save_versioned(&storage, "counter", 1, &Counter { count: 3 }).unwrap();

        let outcome: LoadOutcome<Counter> = load_versioned(&storage, "counter", 1);
        assert_eq!(outcome, LoadOutcome::Restored(Counter { count: 3 }));

        let raw = storage.get_item("counter").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["state"]["count"], 3);
    }

    #[test]
    fn missing_key_defaults() {
        let storage = MemoryStorage::new();
        let outcome: LoadOutcome<Counter> = load_versioned(&storage, "counter", 1);
        assert_eq!(outcome, LoadOutcome::Defaulted);
        assert_eq!(outcome.into_state(), Counter::default());
    }

    #[test]
    fn version_mismatch_defaults() {
        let storage = MemoryStorage::new();
        save_versioned(&storage, "counter", 2, &Counter { count: 9 }).unwrap();

        let outcome: LoadOutcome<Counter> = load_versioned(&storage, "counter", 1);
        assert!(!outcome.is_restored());
    }

    #[test]
    fn corrupt_payload_defaults() {
        let storage = MemoryStorage::new();

        storage.set_item("counter", "{not json").unwrap();
        let outcome: LoadOutcome<Counter> = load_versioned(&storage, "counter", 1);
        assert_eq!(outcome, LoadOutcome::Defaulted);

        storage
            .set_item("counter", r#"{"state":{"count":"three"},"version":1}"#)
            .unwrap();
        let outcome: LoadOutcome<Counter> = load_versioned(&storage, "counter", 1);
        assert_eq!(outcome, LoadOutcome::Defaulted);

        storage.set_item("counter", r#"{"state":{"count":1}}"#).unwrap();
        let outcome: LoadOutcome<Counter> = load_versioned(&storage, "counter", 1);
        assert_eq!(outcome, LoadOutcome::Defaulted);
    }

    #[test]
    fn unreadable_storage_defaults() {
        let storage = MemoryStorage::new();
        let outcome: LoadOutcome<Counter> = load_versioned(&storage, "../bad", 1);
        assert_eq!(outcome, LoadOutcome::Defaulted);
    }
}
