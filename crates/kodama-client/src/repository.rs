// SPDX-License-Identifier: GPL-3.0-or-later
use crate::client::{GetAllOptions, GhibliClient};
use crate::error::Result;
use kodama_domain::Film;

/// Source of the film list.
#[async_trait::async_trait]
pub trait FilmRepository: Send + Sync {
    async fn get_all(&self, options: GetAllOptions) -> Result<Vec<Film>>;
}

#[async_trait::async_trait]
impl FilmRepository for GhibliClient {
    async fn get_all(&self, options: GetAllOptions) -> Result<Vec<Film>> {
        GhibliClient::get_all(self, options).await
    }
}
