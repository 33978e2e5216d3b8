// SPDX-License-Identifier: GPL-3.0-or-later

//! Loading the film list: the use case over a [`FilmRepository`] and the
//! caching layer that coalesces concurrent loads.

use std::sync::Arc;
use std::time::Duration;

use kodama_client::{ClientError, FilmRepository, GetAllOptions};
use kodama_domain::FilmEntity;
use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::GhibliStore;

pub const FILMS_QUERY_KEY: &str = "films";
/// How long a fetched film list is served from cache before a refetch.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Error)]
pub enum FilmsError {
    #[error("failed to load films: {0}")]
    Fetch(Arc<ClientError>),

    #[error("films request cancelled")]
    Cancelled,
}

impl FilmsError {
    /// Whether showing a retry action makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_retryable(),
            Self::Cancelled => false,
        }
    }
}

impl From<ClientError> for FilmsError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Cancelled => Self::Cancelled,
            other => Self::Fetch(Arc::new(other)),
        }
    }
}

/// Fetches the film list and wraps each record in a [`FilmEntity`].
#[derive(Clone)]
pub struct GetFilmsUseCase {
    repository: Arc<dyn FilmRepository>,
}

impl GetFilmsUseCase {
    pub fn new(repository: Arc<dyn FilmRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, options: GetAllOptions) -> Result<Vec<FilmEntity>, ClientError> {
        let films = self.repository.get_all(options).await?;
        Ok(films.into_iter().map(FilmEntity::new).collect())
    }
}

/// Cached, coalescing access to the film list.
///
/// Concurrent callers share one in-flight request. A result is reused until the
/// stale time elapses; failures are never cached. Cancelling one caller only
/// drops that caller's wait.
#[derive(Clone)]
pub struct FilmsQuery {
    use_case: GetFilmsUseCase,
    cache: Cache<&'static str, Arc<Vec<FilmEntity>>>,
}

impl FilmsQuery {
    pub fn new(use_case: GetFilmsUseCase) -> Self {
        Self::with_stale_time(use_case, DEFAULT_STALE_TIME)
    }

    pub fn with_stale_time(use_case: GetFilmsUseCase, stale_time: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(stale_time)
            .build();
        Self { use_case, cache }
    }

    pub async fn fetch(&self, options: GetAllOptions) -> FilmsResult {
        let use_case = self.use_case.clone();
        let load = self.cache.try_get_with(FILMS_QUERY_KEY, async move {
            debug!(target: "films", "loading films from repository");
            use_case
                .execute(GetAllOptions::default())
                .await
                .map(Arc::new)
        });

        let result = match options.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(FilmsError::Cancelled),
                    result = load => result,
                }
            }
            None => load.await,
        };

        result.map_err(|e| {
            warn!(target: "films", error = %e, "film list load failed");
            FilmsError::Fetch(e)
        })
    }

    /// Drop the cached list so the next fetch goes to the network.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&FILMS_QUERY_KEY).await;
    }
}

/// Outcome of a film list load, shared between coalesced callers.
pub type FilmsResult = Result<Arc<Vec<FilmEntity>>, FilmsError>;

/// Replace the store's catalog with a loaded film list.
///
/// Loading goes through [`FilmsQuery::fetch`] without touching the store, so
/// user edits can keep landing while the request is in flight. Call this once
/// the load succeeds; on failure or cancellation simply do not call it and the
/// catalog stays as it was.
pub fn apply_catalog(store: &mut GhibliStore, films: &[FilmEntity]) -> usize {
    store.set_catalog(films.to_vec());
    info!(target: "films", count = films.len(), "catalog refreshed");
    films.len()
}
