//! AnisongDB HTTP client.
//!
//! All catalog traffic goes through [`SongCatalog`]. [`AnisongClient`] is
//! the real implementation: requests are paced by a [`RateLimiter`] and
//! transient failures (server errors, 429s, timeouts) are retried with
//! exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use songlink_core::model::ArtistId;

use crate::config::Config;
use crate::error::{CatalogError, CatalogResult};
use crate::resilience::RateLimiter;
use crate::types::{dedup_entries, ArtistIdSearchRequest, SearchFilter, SearchRequest, SongEntry};

/// Read access to the song catalog.
#[async_trait]
pub trait SongCatalog: Send + Sync {
    /// Free-form search. Results are de-duplicated.
    async fn get_songs(&self, request: &SearchRequest) -> CatalogResult<Vec<SongEntry>>;

    /// Search by artist ids. Results are de-duplicated.
    async fn get_songs_by_artists(
        &self,
        request: &ArtistIdSearchRequest,
    ) -> CatalogResult<Vec<SongEntry>>;

    /// Every entry for `song_name` crediting exactly `artist_ids`.
    ///
    /// The name comparison is exact. No artist ids means no entries.
    async fn exact_song(
        &self,
        song_name: &str,
        artist_ids: &[ArtistId],
    ) -> CatalogResult<Vec<SongEntry>> {
        if artist_ids.is_empty() {
            return Ok(Vec::new());
        }
        let request = ArtistIdSearchRequest::every_artist(artist_ids.to_vec());
        let entries = self.get_songs_by_artists(&request).await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.song_name == song_name)
            .collect())
    }

    /// Entries whose song name is exactly `song_name`.
    async fn search_song_name(&self, song_name: &str) -> CatalogResult<Vec<SongEntry>> {
        self.get_songs(&SearchRequest::by_song_name(SearchFilter::exact(song_name)))
            .await
    }

    /// Entries crediting an artist called exactly `artist_name`.
    async fn search_artist_name(&self, artist_name: &str) -> CatalogResult<Vec<SongEntry>> {
        self.get_songs(&SearchRequest::by_artist_name(SearchFilter::exact(artist_name)))
            .await
    }
}

/// AnisongDB API client.
///
/// Wraps a [`reqwest::Client`] pre-configured with a user agent and the
/// configured timeout.
#[derive(Debug, Clone)]
pub struct AnisongClient {
    http: Client,
    base_url: String,
    max_retries: usize,
    rate_limiter: RateLimiter,
}

impl AnisongClient {
    /// Build a client from the loaded configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &Config) -> CatalogResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("songlink/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.anisong_api_base.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            rate_limiter: RateLimiter::new(config.requests_per_second),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> CatalogResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);

        (|| self.post_once(&url, body))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(500))
                    .with_max_times(self.max_retries),
            )
            .when(CatalogError::is_transient)
            .notify(|err: &CatalogError, delay: Duration| {
                log::warn!("Retrying {} in {:?}: {}", url, delay, err);
            })
            .await
    }

    async fn post_once<B, T>(&self, url: &str, body: &B) -> CatalogResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        self.rate_limiter.acquire().await;
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    CatalogError::Http {
                        message: e.to_string(),
                    }
                } else {
                    CatalogError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(classify_status(status, message));
        }

        response.json().await.map_err(|e| CatalogError::Parse {
            message: e.to_string(),
        })
    }
}

fn classify_status(status: StatusCode, message: String) -> CatalogError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        CatalogError::RateLimited
    } else if status.is_server_error() {
        CatalogError::Http {
            message: format!("{status}: {message}"),
        }
    } else {
        CatalogError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl SongCatalog for AnisongClient {
    async fn get_songs(&self, request: &SearchRequest) -> CatalogResult<Vec<SongEntry>> {
        let entries: Vec<SongEntry> = self.post("search_request", request).await?;
        log::debug!("Song search returned {} entries", entries.len());
        Ok(dedup_entries(entries))
    }

    async fn get_songs_by_artists(
        &self,
        request: &ArtistIdSearchRequest,
    ) -> CatalogResult<Vec<SongEntry>> {
        let entries: Vec<SongEntry> = self.post("artist_ids_request", request).await?;
        log::debug!(
            "Artist search for {:?} returned {} entries",
            request.artist_ids,
            entries.len()
        );
        Ok(dedup_entries(entries))
    }
}
