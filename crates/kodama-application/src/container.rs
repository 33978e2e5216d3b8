// SPDX-License-Identifier: GPL-3.0-or-later
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use kodama_client::{FilmRepository, GetAllOptions, GhibliClient};
use kodama_config::AppConfig;
use kodama_infrastructure::{JsonFileStorage, StateStorage};
use tracing::info;

use crate::films::{apply_catalog, FilmsError, FilmsQuery, FilmsResult, GetFilmsUseCase};
use crate::store::GhibliStore;
use crate::theme::ThemeStore;

/// Everything a front end needs, wired from configuration.
pub struct AppContainer {
    pub config: AppConfig,
    pub films: FilmsQuery,
    pub store: GhibliStore,
    pub theme: ThemeStore,
}

impl AppContainer {
    /// Build against the configured API and a JSON file store under `storage.data_dir`.
    pub fn build(config: AppConfig) -> anyhow::Result<Self> {
        let storage = JsonFileStorage::open(config.storage.data_dir.clone()).with_context(|| {
            format!(
                "failed to open state directory {}",
                config.storage.data_dir.display()
            )
        })?;

        let client = GhibliClient::builder()
            .base_url(config.api.resolved_base_url())
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()
            .context("failed to build films client")?;

        Ok(Self::with_parts(config, Arc::new(client), Arc::new(storage)))
    }

    /// Wire the container from an explicit repository and storage backend.
    pub fn with_parts(
        config: AppConfig,
        repository: Arc<dyn FilmRepository>,
        storage: Arc<dyn StateStorage>,
    ) -> Self {
        let namespace = config.storage.namespace.clone();
        let films = FilmsQuery::new(GetFilmsUseCase::new(repository));
        let store = GhibliStore::open(Arc::clone(&storage), &namespace);
        let theme = ThemeStore::open(storage, &namespace);

        info!(
            target: "application",
            namespace = %namespace,
            restored = store.was_restored(),
            films = store.snapshot().catalog.items.len(),
            "application state initialized"
        );

        Self {
            config,
            films,
            store,
            theme,
        }
    }

    /// Load the film list, from cache when fresh.
    ///
    /// The returned future owns its handle on the query and does not borrow the
    /// container, so the store stays writable until the result is handed to
    /// [`AppContainer::apply_films`].
    pub fn load_films(&self, options: GetAllOptions) -> impl Future<Output = FilmsResult> + 'static {
        let films = self.films.clone();
        async move { films.fetch(options).await }
    }

    /// Like [`AppContainer::load_films`] but drops the cached list first.
    pub fn reload_films(&self, options: GetAllOptions) -> impl Future<Output = FilmsResult> + 'static {
        let films = self.films.clone();
        async move {
            films.invalidate().await;
            films.fetch(options).await
        }
    }

    /// Put a finished load into the catalog. Errors leave the catalog untouched
    /// and are handed back to the caller.
    pub fn apply_films(&mut self, loaded: FilmsResult) -> Result<usize, FilmsError> {
        let films = loaded?;
        Ok(apply_catalog(&mut self.store, &films))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kodama_domain::ThemeMode;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CASTLE_ID: &str = "2baf70d1-42bb-4437-b551-e5fed5a87abe";

    fn films_body() -> serde_json::Value {
        serde_json::json!([
            {
                "id": CASTLE_ID,
                "title": "Castle in the Sky",
                "original_title": "天空の城ラピュタ",
                "original_title_romanised": "Tenkū no shiro Rapyuta",
                "image": "",
                "movie_banner": "",
                "description": "The orphan Sheeta inherited a mysterious crystal.",
                "director": "Hayao Miyazaki",
                "producer": "Isao Takahata",
                "release_date": "1986",
                "running_time": "124",
                "rt_score": "95",
                "people": [],
                "species": [],
                "locations": [],
                "vehicles": [],
                "url": ""
            }
        ])
    }

    fn config_for(server: &MockServer, dir: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.api.base_url = Some(server.uri());
        config.storage.data_dir = dir.path().join("state");
        config.storage.namespace = "test".to_string();
        config
    }

    #[tokio::test]
    async fn loaded_catalog_survives_restart() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/films"))
            .respond_with(ResponseTemplate::new(200).set_body_json(films_body()))
            .expect(1)
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();

        {
            let mut app = AppContainer::build(config_for(&server, &dir)).unwrap();
            assert!(!app.store.was_restored());
            let loaded = app.load_films(GetAllOptions::default()).await;
            assert_eq!(app.apply_films(loaded).unwrap(), 1);
            app.store.toggle_favorite(CASTLE_ID);
            app.theme.toggle();
        }

        let app = AppContainer::build(config_for(&server, &dir)).unwrap();
        assert!(app.store.was_restored());
        let state = app.store.snapshot();
        assert_eq!(state.catalog.items.len(), 1);
        assert!(state.meta(CASTLE_ID).favorite);
        assert_eq!(app.theme.mode(), ThemeMode::Dark);
    }

    #[tokio::test]
    async fn edits_made_during_a_slow_load_are_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/films"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(films_body())
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let mut app = AppContainer::build(config_for(&server, &dir)).unwrap();

        let pending = app.load_films(GetAllOptions::default());
        app.store.toggle_favorite(CASTLE_ID);
        app.store.set_query("castle");
        let loaded = pending.await;
        app.apply_films(loaded).unwrap();

        let state = app.store.snapshot();
        assert!(state.meta(CASTLE_ID).favorite);
        assert_eq!(state.filters.query, "castle");
        assert_eq!(state.visible_films().len(), 1);
    }

    #[tokio::test]
    async fn reload_bypasses_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/films"))
            .respond_with(ResponseTemplate::new(200).set_body_json(films_body()))
            .expect(2)
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let app = AppContainer::build(config_for(&server, &dir)).unwrap();

        app.load_films(GetAllOptions::default()).await.unwrap();
        app.load_films(GetAllOptions::default()).await.unwrap();
        app.reload_films(GetAllOptions::default()).await.unwrap();
    }

    #[tokio::test]
    async fn failed_load_keeps_last_known_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/films"))
            .respond_with(ResponseTemplate::new(200).set_body_json(films_body()))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/films"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let mut app = AppContainer::build(config_for(&server, &dir)).unwrap();

        let loaded = app.load_films(GetAllOptions::default()).await;
        app.apply_films(loaded).unwrap();
        let before = app.store.snapshot();

        let loaded = app.reload_films(GetAllOptions::default()).await;
        let err = app.apply_films(loaded).unwrap_err();

        assert!(matches!(err, FilmsError::Fetch(_)));
        assert!(err.is_retryable());
        assert!(Arc::ptr_eq(&before.catalog, &app.store.snapshot().catalog));
    }
}
