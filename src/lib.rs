//! Movieshelf - personal movie catalog
//!
//! A small web application for keeping a ranked list of favourite movies,
//! with ratings, reviews, and metadata imported from TMDB. The library crate
//! exposes the config loader, the metadata client and the HTTP router so
//! they can be exercised from integration tests.

pub mod config;
pub mod metadata;
pub mod server;
