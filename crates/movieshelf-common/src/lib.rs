//! Movieshelf-Common: shared types used across the movieshelf crates.
//!
//! - **Typed IDs**: [`MovieId`] wraps the store-assigned integer key so it is
//!   never confused with a TMDB external id.
//! - **Error Handling**: the unified [`Error`] taxonomy and [`Result`] alias.
//!
//! # Examples
//!
//! ```
//! use movieshelf_common::{Error, MovieId, Result};
//!
//! let id: MovieId = "42".parse().unwrap();
//! assert_eq!(id.get(), 42);
//!
//! fn lookup(id: MovieId) -> Result<()> {
//!     Err(Error::not_found("movie", id))
//! }
//! assert!(lookup(id).is_err());
//! ```

pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;
