// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{ClientError, Result};
use kodama_domain::Film;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

const GHIBLI_API_BASE: &str = "https://ghibliapi.vercel.app";
const USER_AGENT: &str = concat!("Kodama/", env!("CARGO_PKG_VERSION"));

/// Per-call options for [`GhibliClient::get_all`].
#[derive(Debug, Clone, Default)]
pub struct GetAllOptions {
    /// Cancels the in-flight request when triggered.
    pub cancel: Option<CancellationToken>,
}

impl GetAllOptions {
    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            cancel: Some(cancel),
        }
    }
}

/// Studio Ghibli API client.
#[derive(Debug, Clone)]
pub struct GhibliClient {
    client: Client,
    base_url: Url,
}

impl GhibliClient {
    /// Create a new client against the public endpoint.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a client builder for custom configuration.
    pub fn builder() -> GhibliClientBuilder {
        GhibliClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Fetch every film.
    ///
    /// If `options.cancel` fires before the response is read, the request is
    /// dropped and [`ClientError::Cancelled`] is returned.
    ///
    /// # Example
    /// ```no_run
    /// # use kodama_client::{GetAllOptions, GhibliClient};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = GhibliClient::new()?;
    /// let films = client.get_all(GetAllOptions::default()).await?;
    /// println!("{} films", films.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_all(&self, options: GetAllOptions) -> Result<Vec<Film>> {
        let url = self.endpoint("films")?;

        match options.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(target: "client", "films request cancelled");
                        Err(ClientError::Cancelled)
                    }
                    result = self.get(url) => result,
                }
            }
            None => self.get(url).await,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(path);
        Ok(url)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        trace!(target: "client", "GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        debug!(target: "client", "response status: {}", status);

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        trace!(target: "client", bytes = body.len(), "response body received");

        serde_json::from_str(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

/// Builder for configuring a [`GhibliClient`].
#[derive(Debug)]
pub struct GhibliClientBuilder {
    base_url: String,
    timeout: Duration,
}

impl Default for GhibliClientBuilder {
    fn default() -> Self {
        Self {
            base_url: GHIBLI_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl GhibliClientBuilder {
    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<GhibliClient> {
        let base_url = Url::parse(self.base_url.trim())
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", self.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(self.base_url));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(GhibliClient { client, base_url })
    }
}
