// SPDX-License-Identifier: GPL-3.0-or-later

//! Persisted application state: catalog snapshot, per-film metadata, filters
//! and sort, owned by a single [`GhibliStore`].

use std::sync::Arc;

use chrono::Utc;
use kodama_domain::{
    FilmCatalog, FilmEntity, FilmFilters, FilmMeta, FilmSort, MetaStore, PersonalRating,
    SortDirection, SortKey, StarsFilter,
};
use kodama_infrastructure::StateStorage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::persisted::{Listener, PersistedCell, SubscriptionId};
use crate::query::query_films;

pub const STATE_KEY: &str = "ghibli_state";
pub const STATE_VERSION: u32 = 1;

/// Storage key for the application state under `namespace`.
pub fn state_key(namespace: &str) -> String {
    format!("{}_{}", namespace, STATE_KEY)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhibliState {
    // Shared between successive snapshots; only the part a mutation touches is rebuilt.
    pub catalog: Arc<FilmCatalog>,
    pub meta_by_id: Arc<MetaStore>,
    pub filters: FilmFilters,
    pub sort: FilmSort,
}

impl GhibliState {
    pub fn meta(&self, film_id: &str) -> &FilmMeta {
        self.meta_by_id.get(film_id)
    }

    /// Films currently visible for this snapshot's filters and sort.
    pub fn visible_films(&self) -> Vec<&FilmEntity> {
        query_films(&self.catalog.items, &self.meta_by_id, &self.filters, &self.sort)
    }
}

/// Single writer for [`GhibliState`].
pub struct GhibliStore {
    cell: PersistedCell<GhibliState>,
}

impl GhibliStore {
    /// Restore state from `storage`, falling back to defaults on any failure.
    pub fn open(storage: Arc<dyn StateStorage>, namespace: &str) -> Self {
        Self {
            cell: PersistedCell::open(storage, state_key(namespace), STATE_VERSION),
        }
    }

    pub fn snapshot(&self) -> Arc<GhibliState> {
        Arc::clone(self.cell.get())
    }

    /// Whether the state came from storage rather than defaults.
    pub fn was_restored(&self) -> bool {
        self.cell.was_restored()
    }

    pub fn storage_key(&self) -> &str {
        self.cell.key()
    }

    pub fn visible_films(&self) -> Vec<FilmEntity> {
        self.cell.get().visible_films().into_iter().cloned().collect()
    }

    pub fn subscribe(&mut self, listener: Listener<GhibliState>) -> SubscriptionId {
        self.cell.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.cell.unsubscribe(id)
    }

    fn update(&mut self, change: impl FnOnce(&GhibliState) -> GhibliState) {
        let next = change(self.cell.get());
        self.cell.replace(next);
    }

    fn replace_meta(&mut self, meta_by_id: MetaStore) {
        self.update(|state| GhibliState {
            catalog: Arc::clone(&state.catalog),
            meta_by_id: Arc::new(meta_by_id),
            filters: state.filters.clone(),
            sort: state.sort,
        });
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub fn set_catalog(&mut self, films: Vec<FilmEntity>) {
        let updated_at = Utc::now().timestamp_millis();
        debug!(target: "store", count = films.len(), updated_at, "catalog replaced");
        self.update(|state| GhibliState {
            catalog: Arc::new(FilmCatalog::new(films, updated_at)),
            meta_by_id: Arc::clone(&state.meta_by_id),
            filters: state.filters.clone(),
            sort: state.sort,
        });
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    /// Flip the favorite flag and return the new value.
    pub fn toggle_favorite(&mut self, film_id: &str) -> bool {
        let (meta_by_id, favorite) = self.cell.get().meta_by_id.toggle_favorite(film_id);
        debug!(target: "store", film_id, favorite, "favorite toggled");
        self.replace_meta(meta_by_id);
        favorite
    }

    /// Flip the watched flag and return the new value.
    pub fn toggle_watched(&mut self, film_id: &str) -> bool {
        let (meta_by_id, watched) = self.cell.get().meta_by_id.toggle_watched(film_id);
        debug!(target: "store", film_id, watched, "watched toggled");
        self.replace_meta(meta_by_id);
        watched
    }

    pub fn save_note(&mut self, film_id: &str, note: impl Into<String>, rating: PersonalRating) {
        let meta_by_id = self.cell.get().meta_by_id.save_note(film_id, note, rating);
        debug!(target: "store", film_id, rating = rating.value(), "note saved");
        self.replace_meta(meta_by_id);
    }

    pub fn remove_note(&mut self, film_id: &str) {
        let meta_by_id = self.cell.get().meta_by_id.remove_note(film_id);
        debug!(target: "store", film_id, "note removed");
        self.replace_meta(meta_by_id);
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    fn update_filters(&mut self, change: impl FnOnce(&FilmFilters) -> FilmFilters) {
        self.update(|state| GhibliState {
            catalog: Arc::clone(&state.catalog),
            meta_by_id: Arc::clone(&state.meta_by_id),
            filters: change(&state.filters),
            sort: state.sort,
        });
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.update_filters(|filters| filters.with_query(query));
    }

    pub fn toggle_include_synopsis(&mut self) {
        self.update_filters(|filters| filters.with_include_synopsis(!filters.include_synopsis));
    }

    pub fn toggle_watched_only(&mut self) {
        self.update_filters(|filters| filters.with_watched_only(!filters.watched_only));
    }

    pub fn toggle_favorite_only(&mut self) {
        self.update_filters(|filters| filters.with_favorite_only(!filters.favorite_only));
    }

    pub fn toggle_noted_only(&mut self) {
        self.update_filters(|filters| filters.with_noted_only(!filters.noted_only));
    }

    pub fn set_stars_filter(&mut self, stars: Option<StarsFilter>) {
        self.update_filters(|filters| filters.with_stars(stars));
    }

    pub fn clear_filters(&mut self) {
        self.update_filters(|_| FilmFilters::default());
    }

    // ------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.update(|state| GhibliState {
            catalog: Arc::clone(&state.catalog),
            meta_by_id: Arc::clone(&state.meta_by_id),
            filters: state.filters.clone(),
            sort: state.sort.with_key(key),
        });
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.update(|state| GhibliState {
            catalog: Arc::clone(&state.catalog),
            meta_by_id: Arc::clone(&state.meta_by_id),
            filters: state.filters.clone(),
            sort: state.sort.with_direction(direction),
        });
    }
}
