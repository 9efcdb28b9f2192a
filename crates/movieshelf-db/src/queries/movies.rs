//! Catalog CRUD operations.
//!
//! These functions are the whole repository surface for movies. Every
//! statement is parameterized; ordering and not-found handling live here so
//! callers never inspect raw rusqlite errors.

use movieshelf_common::{Error, MovieId, Result};
use rusqlite::Connection;

use crate::models::{Movie, NewMovie, MOVIE_COLUMNS};

/// Longest title the catalog accepts, in characters.
pub const MAX_TITLE_LEN: usize = 250;

/// List every movie, ordered by id ascending.
pub fn list_movies(conn: &Connection) -> Result<Vec<Movie>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY id ASC"))
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Movie::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Get a movie by id.
///
/// # Returns
///
/// * `Ok(Movie)` - The stored movie
/// * `Err(Error::NotFound)` - If no movie has this id
/// * `Err(Error::Database)` - If a database error occurs
pub fn get_movie(conn: &Connection, id: MovieId) -> Result<Movie> {
    let result = conn.query_row(
        &format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?1"),
        [id.get()],
        Movie::from_row,
    );
    match result {
        Ok(m) => Ok(m),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::not_found("movie", id)),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Insert a new movie and return it with its assigned id.
///
/// # Returns
///
/// * `Ok(Movie)` - The stored movie
/// * `Err(Error::Validation)` - If the title is blank or too long
/// * `Err(Error::Conflict)` - If a movie with the same title already exists
/// * `Err(Error::Database)` - If a database error occurs
pub fn create_movie(conn: &Connection, movie: &NewMovie) -> Result<Movie> {
    if movie.title.trim().is_empty() {
        return Err(Error::Validation("title is required".into()));
    }
    if movie.title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }

    conn.execute(
        "INSERT INTO movies (title, year, description, rating, ranking, review, img_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            movie.title,
            movie.year,
            movie.description,
            movie.rating,
            movie.ranking,
            movie.review,
            movie.img_url,
        ],
    )
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            Error::Conflict(format!("Movie '{}' already exists", movie.title))
        } else {
            Error::database(e.to_string())
        }
    })?;

    let id = MovieId::new(conn.last_insert_rowid());
    tracing::debug!(%id, title = %movie.title, "Created movie");

    Ok(movie.clone().into_movie(id))
}

/// Overwrite the rating and review of a movie, leaving every other field
/// untouched. Returns the updated movie.
pub fn update_review(
    conn: &Connection,
    id: MovieId,
    rating: f64,
    review: &str,
) -> Result<Movie> {
    let n = conn
        .execute(
            "UPDATE movies SET rating = ?1, review = ?2 WHERE id = ?3",
            rusqlite::params![rating, review, id.get()],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if n == 0 {
        return Err(Error::not_found("movie", id));
    }

    get_movie(conn, id)
}

/// Delete a movie.
pub fn delete_movie(conn: &Connection, id: MovieId) -> Result<()> {
    let n = conn
        .execute("DELETE FROM movies WHERE id = ?1", [id.get()])
        .map_err(|e| Error::database(e.to_string()))?;

    if n == 0 {
        return Err(Error::not_found("movie", id));
    }

    tracing::debug!(%id, "Deleted movie");
    Ok(())
}

/// Number of movies in the catalog.
pub fn count_movies(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}
