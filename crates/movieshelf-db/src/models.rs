//! Rust models matching the database schema.

use movieshelf_common::MovieId;
use serde::{Deserialize, Serialize};

/// Column list shared by every `SELECT` that builds a [`Movie`].
pub(crate) const MOVIE_COLUMNS: &str =
    "id, title, year, description, rating, ranking, review, img_url";

/// A catalog entry: one movie and the user's rating/review of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub ranking: Option<i32>,
    pub review: Option<String>,
    pub img_url: Option<String>,
}

impl Movie {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: MovieId::new(row.get(0)?),
            title: row.get(1)?,
            year: row.get(2)?,
            description: row.get(3)?,
            rating: row.get(4)?,
            ranking: row.get(5)?,
            review: row.get(6)?,
            img_url: row.get(7)?,
        })
    }
}

/// Field values for a movie that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub ranking: Option<i32>,
    pub review: Option<String>,
    pub img_url: Option<String>,
}

impl NewMovie {
    /// A movie with only a title set.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Attach the store-assigned id.
    pub fn into_movie(self, id: MovieId) -> Movie {
        Movie {
            id,
            title: self.title,
            year: self.year,
            description: self.description,
            rating: self.rating,
            ranking: self.ranking,
            review: self.review,
            img_url: self.img_url,
        }
    }
}
