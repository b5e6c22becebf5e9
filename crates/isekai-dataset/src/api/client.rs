//! Jikan API client with rate limiting and retry logic.

use super::rate_limiter::RateLimiter;
use super::transport::{HttpTransport, Transport};
use super::types::*;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use shared::config::JikanConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Maximum page size accepted by the list endpoint
pub const MAX_PAGE_SIZE: usize = 25;

/// Errors surfaced by [`JikanClient`]
#[derive(Error, Debug)]
pub enum ApiError {
    /// Every attempt was rate limited or hit a network failure
    #[error("{url}: gave up after {attempts} attempts ({last_error})")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    /// Non-success status other than 429; not retried
    #[error("{url}: HTTP {status}: {body}")]
    Http {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("{url}: failed to parse response: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{url}: response has no data")]
    MissingData { url: String },

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Query for one page of the genre listing
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeListQuery {
    pub genre_id: u32,
    pub page: u32,
    pub limit: usize,
    pub order_by: Option<String>,
    pub sort: Option<String>,
    pub sfw: Option<bool>,
}

impl AnimeListQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("genres", self.genre_id.to_string()),
            ("page", self.page.to_string()),
            ("limit", self.limit.min(MAX_PAGE_SIZE).to_string()),
        ];
        if let Some(order_by) = &self.order_by {
            params.push(("order_by", order_by.clone()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort", sort.clone()));
        }
        if let Some(sfw) = self.sfw {
            params.push(("sfw", sfw.to_string()));
        }
        params
    }
}

/// Jikan API v4 client
///
/// Cheap to share behind an `Arc`: every method takes `&self`, and all
/// pacing state lives in the shared [`RateLimiter`].
#[derive(Debug)]
pub struct JikanClient {
    /// HTTP GET capability
    transport: Arc<dyn Transport>,
    /// Base URL for Jikan API
    base_url: String,
    /// Rate limiter shared by every request this client makes
    rate_limiter: Arc<RateLimiter>,
    /// Total attempts per request
    max_attempts: u32,
    /// First retry delay; doubled after each failed attempt
    initial_backoff: Duration,
}

impl JikanClient {
    /// Create a client talking HTTP, configured from the `[jikan]` settings
    pub fn new(config: &JikanConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(
            &config.user_agent,
            Duration::from_secs(config.request_timeout_secs),
        )?;

        Ok(Self::with_transport(
            Arc::new(transport),
            config.base_url.clone(),
            Arc::new(RateLimiter::new(
                config.rate_limit.requests_per_second,
                config.rate_limit.requests_per_minute,
            )),
            config.max_attempts,
            Duration::from_millis(config.retry_delay_ms),
        ))
    }

    /// Create a client on top of an arbitrary transport
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        base_url: String,
        rate_limiter: Arc<RateLimiter>,
        max_attempts: u32,
        initial_backoff: Duration,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter,
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// The limiter gating this client's requests
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Make a GET request with rate limiting and retry logic
    ///
    /// HTTP 429 and transport failures are retried with exponential backoff
    /// under one shared attempt budget; any other error status is returned
    /// immediately.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut backoff = self.initial_backoff;
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            self.rate_limiter.wait().await;

            debug!(url = %url, attempt = attempt, "Making API request");

            match self.transport.get(&url, params).await {
                Ok(response) if response.status == StatusCode::TOO_MANY_REQUESTS => {
                    warn!(
                        url = %url,
                        attempt = attempt,
                        backoff_ms = backoff.as_millis(),
                        "Rate limited by server"
                    );
                    last_error = "rate limited (HTTP 429)".to_string();
                }
                Ok(response) if !response.status.is_success() => {
                    warn!(url = %url, status = %response.status, "Request failed");
                    return Err(ApiError::Http {
                        url,
                        status: response.status,
                        body: response.body,
                    });
                }
                Ok(response) => {
                    debug!(url = %url, "Request successful");
                    return serde_json::from_str(&response.body)
                        .map_err(|source| ApiError::Decode { url, source });
                }
                Err(e) => {
                    warn!(
                        url = %url,
                        attempt = attempt,
                        error = %e,
                        backoff_ms = backoff.as_millis(),
                        "Request error"
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < self.max_attempts {
                sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }
        }

        Err(ApiError::RetriesExhausted {
            url,
            attempts: self.max_attempts,
            last_error,
        })
    }

    /// Fetch one page of anime tagged with a genre
    pub async fn list_anime(
        &self,
        query: &AnimeListQuery,
    ) -> Result<ListResponse<AnimeEntry>, ApiError> {
        self.get("/anime", &query.params()).await
    }

    /// Fetch the character list of an anime
    pub async fn anime_characters(&self, anime_id: u32) -> Result<Vec<CharacterEntry>, ApiError> {
        let response: ListResponse<CharacterEntry> = self
            .get(&format!("/anime/{}/characters", anime_id), &[])
            .await?;
        Ok(response.data)
    }

    /// Fetch full character details by MAL ID
    pub async fn character(&self, character_id: u32) -> Result<CharacterDetails, ApiError> {
        let endpoint = format!("/characters/{}", character_id);
        let response: ItemResponse<CharacterDetails> = self.get(&endpoint, &[]).await?;
        response.data.ok_or_else(|| ApiError::MissingData {
            url: format!("{}{}", self.base_url, endpoint),
        })
    }
}
