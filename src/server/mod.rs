use crate::config::Config;
use crate::metadata::{MetadataProvider, TmdbProvider};
use anyhow::{Context, Result};
use axum::{middleware, Router};
use movieshelf_db::pool::DbPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;

pub mod csrf;
pub mod error;
pub mod forms;
pub mod request_id;
pub mod routes_movies;
pub mod views;

use csrf::CsrfSigner;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    /// Catalog database pool
    pub db: DbPool,
    /// Configuration, read-only after startup
    pub config: Arc<Config>,
    /// Source of movie metadata for search and import
    pub metadata: Arc<dyn MetadataProvider>,
    /// Form token issuer/verifier
    pub csrf: Arc<CsrfSigner>,
}

impl AppContext {
    /// Build a context, generating a throwaway form secret when none is configured.
    pub fn new(config: Config, db: DbPool, metadata: Arc<dyn MetadataProvider>) -> Self {
        let secret = match config.security.secret_key.clone() {
            Some(secret) => secret,
            None => {
                tracing::warn!("No secret key configured, generating a random one for this run");
                csrf::generate_secret()
            }
        };
        let csrf = CsrfSigner::new(secret, config.security.csrf_token_ttl_secs);

        Self {
            db,
            config: Arc::new(config),
            metadata,
            csrf: Arc::new(csrf),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    routes_movies::movie_routes()
        .fallback(routes_movies::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .with_state(ctx)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let db_path = &config.database.path;
    let db = movieshelf_db::pool::init_pool(db_path, config.database.max_connections)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    tracing::info!("Database ready at {}", db_path.display());

    let provider = TmdbProvider::new(&config.tmdb).context("Failed to create TMDB client")?;
    if !provider.is_available() {
        tracing::warn!(
            provider = provider.name(),
            "Metadata credentials missing, movie search and import will fail"
        );
    }
    let ctx = AppContext::new(config, db, Arc::new(provider));

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
