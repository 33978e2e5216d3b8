// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::Arc;

use kodama_domain::ThemeMode;
use kodama_infrastructure::StateStorage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::persisted::{Listener, PersistedCell, SubscriptionId};

pub const THEME_KEY: &str = "theme";
pub const THEME_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThemeState {
    pub mode: ThemeMode,
}

/// Light/dark preference, persisted next to the application state.
pub struct ThemeStore {
    cell: PersistedCell<ThemeState>,
}

impl ThemeStore {
    pub fn open(storage: Arc<dyn StateStorage>, namespace: &str) -> Self {
        Self {
            cell: PersistedCell::open(storage, format!("{}_{}", namespace, THEME_KEY), THEME_VERSION),
        }
    }

    pub fn mode(&self) -> ThemeMode {
        self.cell.get().mode
    }

    pub fn set_mode(&mut self, mode: ThemeMode) {
        debug!(target: "store", %mode, "theme mode set");
        self.cell.replace(ThemeState { mode });
    }

    /// Switch between light and dark; returns the new mode.
    pub fn toggle(&mut self) -> ThemeMode {
        let next = self.mode().toggled();
        self.set_mode(next);
        next
    }

    pub fn subscribe(&mut self, listener: Listener<ThemeState>) -> SubscriptionId {
        self.cell.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.cell.unsubscribe(id)
    }
}
