//! Movieshelf-DB: the catalog store.
//!
//! SQLite persistence for movie records using rusqlite with r2d2 connection
//! pooling.
//!
//! # Modules
//!
//! - `migrations` - Embedded schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the database schema
//! - `queries` - Catalog operations
//!
//! # Example
//!
//! ```
//! use movieshelf_db::models::NewMovie;
//! use movieshelf_db::pool::{get_conn, init_memory_pool};
//! use movieshelf_db::queries::movies;
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let movie = movies::create_movie(&conn, &NewMovie::titled("Phone Booth")).unwrap();
//! assert_eq!(movies::list_movies(&conn).unwrap(), vec![movie]);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
