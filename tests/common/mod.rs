//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which builds a full [`AppContext`] over an
//! in-memory DB and a canned [`StubProvider`] (or a real [`TmdbProvider`]
//! pointed at a mock server), plus small helpers for driving the router.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use http_body_util::BodyExt;

use movieshelf::config::Config;
use movieshelf::metadata::{MetadataProvider, MovieDetails, SearchResult, TmdbProvider};
use movieshelf::server::{create_router, AppContext};
use movieshelf_common::{Error, Result};
use movieshelf_db::pool::{init_memory_pool, DbPool};

pub const TEST_SECRET: &str = "test-secret";

/// Metadata provider serving fixed answers.
#[derive(Default)]
pub struct StubProvider {
    pub results: Vec<SearchResult>,
    pub details: HashMap<String, MovieDetails>,
}

impl StubProvider {
    /// One search hit and its details: Inception, TMDB id 27205.
    pub fn inception() -> Self {
        let mut details = HashMap::new();
        details.insert("27205".to_string(), inception_details());
        Self {
            results: vec![SearchResult {
                id: "27205".into(),
                title: "Inception".into(),
                release_date: Some("2010-07-15".into()),
                overview: Some("Cobb steals secrets from dreams.".into()),
                poster_path: Some("/abc.jpg".into()),
            }],
            details,
        }
    }
}

pub fn inception_details() -> MovieDetails {
    MovieDetails {
        id: "27205".into(),
        title: "Inception".into(),
        release_date: Some("2010-07-15".into()),
        overview: Some("Cobb steals secrets from dreams.".into()),
        poster_path: Some("/abc.jpg".into()),
    }
}

#[async_trait]
impl MetadataProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn search_movie(&self, _query: &str) -> Result<Vec<SearchResult>> {
        Ok(self.results.clone())
    }

    async fn movie_details(&self, external_id: &str) -> Result<MovieDetails> {
        self.details
            .get(external_id)
            .cloned()
            .ok_or_else(|| Error::upstream(format!("TMDB 404 Not Found: {external_id}")))
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
}

impl TestHarness {
    /// Harness answering metadata calls with [`StubProvider::inception`].
    pub fn new() -> Self {
        Self::with_provider(Arc::new(StubProvider::inception()))
    }

    pub fn with_provider(provider: Arc<dyn MetadataProvider>) -> Self {
        Self::with_config_and_provider(test_config(), provider)
    }

    /// Harness talking to a real TMDB client at `api_base_url`.
    pub fn with_tmdb(api_base_url: &str) -> Self {
        let mut config = test_config();
        config.tmdb.api_base_url = api_base_url.to_string();
        config.tmdb.bearer_token = Some("test-token".into());
        config.tmdb.api_key = Some("test-key".into());
        let provider = TmdbProvider::new(&config.tmdb).expect("failed to build TMDB client");
        Self::with_config_and_provider(config, Arc::new(provider))
    }

    pub fn with_config_and_provider(config: Config, provider: Arc<dyn MetadataProvider>) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(config, db.clone(), provider);
        Self { ctx, db }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    /// A form token valid for this harness.
    pub fn token(&self) -> String {
        self.ctx.csrf.issue()
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> movieshelf_db::pool::PooledConnection {
        movieshelf_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.security.secret_key = Some(TEST_SECRET.into());
    config
}

/// Build an urlencoded form POST.
pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

/// Helper to get response body as string
pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Pull the hidden form token out of a rendered page.
pub fn extract_token(page: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = page.find(marker).expect("page has no csrf_token field") + marker.len();
    let end = page[start..].find('"').expect("unterminated value") + start;
    page[start..end].to_string()
}
