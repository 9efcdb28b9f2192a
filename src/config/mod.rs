mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variables that override file configuration.
pub const ENV_BEARER_TOKEN: &str = "BEARER_TOKEN";
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_HOST: &str = "MOVIESHELF_HOST";
pub const ENV_PORT: &str = "MOVIESHELF_PORT";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./movieshelf.toml",
        "~/.config/movieshelf/config.toml",
        "/etc/movieshelf/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Load a config file (or defaults), then layer the process environment on
/// top. A `.env` file in the working directory is read first if present.
pub fn load_with_env(custom_path: Option<&Path>) -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {:?}", path);
    }

    let mut config = load_config_or_default(custom_path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = non_empty(ENV_BEARER_TOKEN) {
        config.tmdb.bearer_token = Some(token);
    }
    if let Some(key) = non_empty(ENV_API_KEY) {
        config.tmdb.api_key = Some(key);
    }
    if let Some(secret) = non_empty(ENV_SECRET_KEY) {
        config.security.secret_key = Some(secret);
    }
    if let Some(url) = non_empty(ENV_DATABASE_URL) {
        config.database.path = database_path_from_url(&url)?;
    }
    if let Some(host) = non_empty(ENV_HOST) {
        config.server.host = host;
    }
    if let Some(port) = non_empty(ENV_PORT) {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("{ENV_PORT} is not a valid port: {port}"))?;
    }

    Ok(())
}

/// Turn a storage connection string into a SQLite file path.
///
/// Accepts a bare path, `sqlite://path`, or the SQLAlchemy-style
/// `sqlite:///relative.db` / `sqlite:////absolute.db` forms.
pub fn database_path_from_url(url: &str) -> Result<PathBuf> {
    let url = url.trim();

    if let Some(rest) = url.strip_prefix("sqlite:///") {
        return non_empty_path(rest, url);
    }
    if let Some(rest) = url.strip_prefix("sqlite://") {
        return non_empty_path(rest, url);
    }
    if let Some((scheme, _)) = url.split_once("://") {
        anyhow::bail!("Unsupported database scheme '{scheme}' (only sqlite is supported)");
    }

    non_empty_path(url, url)
}

fn non_empty_path(path: &str, url: &str) -> Result<PathBuf> {
    if path.is_empty() {
        anyhow::bail!("Database URL has no path: {url}");
    }
    Ok(PathBuf::from(path))
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.tmdb.requests_per_second == 0 {
        anyhow::bail!("tmdb.requests_per_second must be at least 1");
    }

    if config.tmdb.timeout_secs == 0 {
        anyhow::bail!("tmdb.timeout_secs must be at least 1");
    }

    if config.security.csrf_token_ttl_secs == 0 {
        anyhow::bail!("security.csrf_token_ttl_secs must be at least 1");
    }

    if config.database.max_connections == 0 {
        anyhow::bail!("database.max_connections must be at least 1");
    }

    Ok(())
}

/// Non-fatal issues worth logging at startup.
pub fn config_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.tmdb.bearer_token.is_none() {
        warnings.push(format!(
            "tmdb.bearer_token is not set ({ENV_BEARER_TOKEN}); movie search will fail"
        ));
    }
    if config.tmdb.api_key.is_none() {
        warnings.push(format!(
            "tmdb.api_key is not set ({ENV_API_KEY}); movie import will fail"
        ));
    }
    if config.security.secret_key.is_none() {
        warnings.push(format!(
            "security.secret_key is not set ({ENV_SECRET_KEY}); a random key will be used \
             and forms will not survive a restart"
        ));
    }

    warnings
}
