// SPDX-License-Identifier: GPL-3.0-or-later
pub mod container;
pub mod films;
pub mod highlight;
mod persisted;
pub mod query;
pub mod store;
pub mod telemetry;
pub mod theme;

pub use container::AppContainer;
pub use films::{apply_catalog, FilmsError, FilmsQuery, FilmsResult, GetFilmsUseCase, DEFAULT_STALE_TIME};
pub use highlight::{highlight_segments, Segment};
pub use persisted::{Listener, SubscriptionId};
pub use query::query_films;
pub use store::{state_key, GhibliState, GhibliStore};
pub use telemetry::init_tracing;
pub use theme::{ThemeState, ThemeStore};
