//! TMDB (The Movie Database) metadata provider.
//!
//! Implements [`MetadataProvider`] against the TMDB v3 REST API.
//!
//! - Searches authenticate with the read access token (`Authorization: Bearer`).
//! - Detail lookups authenticate with the v3 `api_key` query parameter.
//! - Token-bucket rate limiting via [`governor`]; no retries.
//! - Request timeout taken from [`TmdbConfig::timeout_secs`].

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use movieshelf_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::TmdbConfig;
use crate::metadata::provider::{MetadataProvider, MovieDetails, SearchResult};

/// Upstream error bodies are cut to this many characters before logging.
const MAX_ERROR_BODY: usize = 200;

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    results: Vec<TmdbMovieSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieSearchResult {
    id: u64,
    title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetail {
    id: u64,
    title: String,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// TMDB metadata provider.
///
/// # Examples
///
/// ```no_run
/// use movieshelf::config::TmdbConfig;
/// use movieshelf::metadata::TmdbProvider;
///
/// let mut config = TmdbConfig::default();
/// config.bearer_token = Some("read-access-token".into());
/// config.api_key = Some("v3-api-key".into());
/// let provider = TmdbProvider::new(&config).unwrap();
/// ```
pub struct TmdbProvider {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
    api_key: Option<String>,
    language: String,
    limiter: DirectLimiter,
}

impl TmdbProvider {
    /// Create a provider from the TMDB section of the configuration.
    pub fn new(config: &TmdbConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {e}")))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.as_deref().map(strip_bearer_prefix),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            limiter,
        })
    }

    /// Send a prepared request and decode a JSON body.
    ///
    /// Transport failures, non-success statuses and undecodable bodies all
    /// map to [`Error::Upstream`].
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        self.limiter.until_ready().await;

        let resp = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::upstream(format!("TMDB request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(Error::upstream(format!("TMDB {status}: {body}")));
        }

        resp.json::<T>()
            .await
            .map_err(|e| Error::upstream(format!("TMDB parse error: {e}")))
    }
}

/// Accept tokens configured either bare or with a leading `Bearer `.
fn strip_bearer_prefix(token: &str) -> String {
    let token = token.trim();
    token
        .strip_prefix("Bearer ")
        .or_else(|| token.strip_prefix("bearer "))
        .unwrap_or(token)
        .trim()
        .to_string()
}

/// TMDB movie ids are positive integers; anything else never reaches the URL.
fn validate_external_id(external_id: &str) -> Result<&str> {
    let id = external_id.trim();
    if id.is_empty() {
        return Err(Error::Validation("TMDB id is required".into()));
    }
    if !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation(format!("Invalid TMDB id: {id}")));
    }
    Ok(id)
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    fn is_available(&self) -> bool {
        self.bearer_token.as_deref().is_some_and(|t| !t.is_empty())
            && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    async fn search_movie(&self, query: &str) -> Result<Vec<SearchResult>> {
        let token = self
            .bearer_token
            .as_deref()
            .ok_or_else(|| Error::Internal("TMDB bearer token not configured".into()))?;

        let url = format!("{}/search/movie", self.base_url);
        debug!(url = %url, query, "TMDB search movie");

        let request = self.client.get(&url).bearer_auth(token).query(&[
            ("query", query),
            ("include_adult", "false"),
            ("page", "1"),
            ("language", self.language.as_str()),
        ]);

        let body: TmdbSearchResponse = self.send(request).await?;

        Ok(body
            .results
            .into_iter()
            .map(|r| SearchResult {
                id: r.id.to_string(),
                title: r.title.unwrap_or_default(),
                release_date: r.release_date,
                overview: r.overview,
                poster_path: r.poster_path,
            })
            .collect())
    }

    async fn movie_details(&self, external_id: &str) -> Result<MovieDetails> {
        let id = validate_external_id(external_id)?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Internal("TMDB API key not configured".into()))?;

        let url = format!("{}/movie/{id}", self.base_url);
        debug!(url = %url, "TMDB get movie details");

        let request = self
            .client
            .get(&url)
            .query(&[("language", self.language.as_str()), ("api_key", api_key)]);

        let detail: TmdbMovieDetail = self.send(request).await?;

        Ok(MovieDetails {
            id: detail.id.to_string(),
            title: detail.title,
            release_date: detail.release_date,
            overview: detail.overview,
            poster_path: detail.poster_path,
        })
    }
}
