//! Database query modules.
//!
//! - movies: catalog CRUD

pub mod movies;
