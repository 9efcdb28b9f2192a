//! Trait definition and types for metadata providers.
//!
//! The catalog only ever needs two things from an external movie database:
//! a free-text title search and a detail lookup by the provider's own id.

use async_trait::async_trait;
use movieshelf_common::Result;
use movieshelf_db::models::NewMovie;
use serde::{Deserialize, Serialize};

/// Review text stored on freshly imported movies until the user edits them.
pub const PLACEHOLDER_REVIEW: &str = "This movie is so good";
/// Rating stored on freshly imported movies until the user edits them.
pub const PLACEHOLDER_RATING: f64 = 1.0;
/// Ranking stored on freshly imported movies.
pub const PLACEHOLDER_RANKING: i32 = 5;

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// A single candidate returned from a title search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Provider-specific identifier (the TMDB numeric id, as a string).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Release date as returned by the provider, usually `YYYY-MM-DD`.
    pub release_date: Option<String>,
    /// Short synopsis.
    pub overview: Option<String>,
    /// Poster path fragment such as `/abc.jpg`.
    pub poster_path: Option<String>,
}

impl SearchResult {
    /// Release year, if the release date carries one.
    pub fn year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

/// Full details for one movie, enough to create a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: String,
    pub title: String,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
}

impl MovieDetails {
    /// Map these details onto a catalog record.
    ///
    /// Rating, review and ranking get placeholder values; the user is
    /// expected to edit them afterwards.
    pub fn into_new_movie(self, image_base_url: &str) -> NewMovie {
        NewMovie {
            year: release_year(self.release_date.as_deref()),
            img_url: poster_url(image_base_url, self.poster_path.as_deref()),
            title: self.title,
            description: self.overview,
            rating: Some(PLACEHOLDER_RATING),
            ranking: Some(PLACEHOLDER_RANKING),
            review: Some(PLACEHOLDER_REVIEW.to_string()),
        }
    }
}

/// Year taken from the part of a release date before the first `-`.
pub fn release_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.split('-').next())
        .map(str::trim)
        .filter(|y| !y.is_empty())
        .and_then(|y| y.parse::<i32>().ok())
}

/// Join the image base URL and a poster path fragment.
pub fn poster_url(image_base_url: &str, poster_path: Option<&str>) -> Option<String> {
    let path = poster_path.map(str::trim).filter(|p| !p.is_empty())?;
    let base = image_base_url.trim_end_matches('/');
    if path.starts_with('/') {
        Some(format!("{base}{path}"))
    } else {
        Some(format!("{base}/{path}"))
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Async trait implemented by external movie databases.
///
/// Both operations are pure reads with no local side effects. Failures of the
/// remote service (transport, non-success status, unparseable body) surface
/// as [`movieshelf_common::Error::Upstream`].
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when every credential the provider needs is configured.
    fn is_available(&self) -> bool;

    /// Free-text search for movies whose title matches `query`.
    ///
    /// Results keep the provider's ordering. No matches is an empty list.
    async fn search_movie(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// Fetch full details for the movie identified by `external_id`.
    async fn movie_details(&self, external_id: &str) -> Result<MovieDetails>;
}
