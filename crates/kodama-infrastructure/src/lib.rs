// SPDX-License-Identifier: GPL-3.0-or-later
pub mod persist;
pub mod storage;

pub use persist::{load_versioned, save_versioned, LoadOutcome, PersistedEnvelope};
pub use storage::{JsonFileStorage, MemoryStorage, StateStorage, StorageError};
