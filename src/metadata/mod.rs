//! Metadata client for importing movies from an external database.
//!
//! # Module layout
//!
//! - [`provider`] -- Trait definition and shared data types.
//! - [`providers`] -- Concrete provider implementations (TMDB).

pub mod provider;
pub mod providers;

pub use provider::{MetadataProvider, MovieDetails, SearchResult};
pub use providers::TmdbProvider;
