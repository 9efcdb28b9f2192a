use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Upper bound on pooled SQLite connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("movieshelf.db")
}

fn default_max_connections() -> u32 {
    4
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Credentials and endpoints for The Movie Database.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// Read access token sent as `Authorization: Bearer` on searches
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// v3 API key sent as the `api_key` query parameter on detail lookups
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Prefix joined with a poster path to build the stored image URL
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_language() -> String {
    "en-US".to_string()
}
fn default_api_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}
fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_requests_per_second() -> u32 {
    20
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            bearer_token: None,
            api_key: None,
            language: default_language(),
            api_base_url: default_api_base_url(),
            image_base_url: default_image_base_url(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityConfig {
    /// Secret used to sign form tokens (generate with `movieshelf generate-secret`)
    #[serde(default)]
    pub secret_key: Option<String>,

    /// How long a form token stays valid, in seconds (default: 3600)
    #[serde(default = "default_csrf_ttl")]
    pub csrf_token_ttl_secs: u64,
}

fn default_csrf_ttl() -> u64 {
    3600
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            csrf_token_ttl_secs: default_csrf_ttl(),
        }
    }
}
