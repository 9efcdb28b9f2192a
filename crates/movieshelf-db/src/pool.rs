//! SQLite connection pooling for the catalog.
//!
//! File-backed pools run in WAL mode with a busy timeout, so a write that
//! races another connection waits for the lock instead of failing. Memory
//! pools back the test suites: each one is a separately named shared-cache
//! database that exists only while at least one of its connections is open.

use std::path::Path;
use std::time::Duration;

use movieshelf_common::{Error, Result};
use r2d2::{Builder, Pool};
use r2d2_sqlite::SqliteConnectionManager;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pool size used when the caller has no configured value.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if needed) the catalog database at `db_path`.
///
/// Missing parent directories are created. Pending migrations run before the
/// pool is returned.
pub fn init_pool(db_path: &Path, max_connections: u32) -> Result<DbPool> {
    if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
    });

    open(Pool::builder().max_size(max_connections.max(1)), manager)
}

/// Fresh, isolated in-memory catalog.
pub fn init_memory_pool() -> Result<DbPool> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);

    let manager =
        SqliteConnectionManager::file(format!("file:movieshelf_mem_{n}?mode=memory&cache=shared"));

    // Never recycle connections: closing the last one drops the database.
    let builder = Pool::builder()
        .max_size(DEFAULT_MAX_CONNECTIONS)
        .max_lifetime(None)
        .idle_timeout(None);

    open(builder, manager)
}

/// Convenience helper to get a connection from the pool.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {e}")))
}

fn open(
    builder: Builder<SqliteConnectionManager>,
    manager: SqliteConnectionManager,
) -> Result<DbPool> {
    let pool = builder
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {e}")))?;

    let conn = get_conn(&pool)?;
    let applied = migrations::run_migrations(&conn)?;
    drop(conn);
    tracing::debug!(max_connections = pool.max_size(), applied, "Catalog pool ready");

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_movies(pool: &DbPool) -> i64 {
        get_conn(pool)
            .unwrap()
            .query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn memory_pool_is_migrated() {
        let pool = init_memory_pool().unwrap();
        assert_eq!(pool.max_size(), DEFAULT_MAX_CONNECTIONS);
        assert_eq!(count_movies(&pool), 0);
    }

    #[test]
    fn memory_pool_connections_share_state() {
        let pool = init_memory_pool().unwrap();

        {
            let conn = get_conn(&pool).unwrap();
            conn.execute("INSERT INTO movies (title) VALUES ('Alien')", [])
                .unwrap();
        }

        let _held = get_conn(&pool).unwrap();
        let conn = get_conn(&pool).unwrap();
        let title: String = conn
            .query_row("SELECT title FROM movies", [], |row| row.get(0))
            .unwrap();
        assert_eq!(title, "Alien");
    }

    #[test]
    fn memory_pools_are_isolated() {
        let a = init_memory_pool().unwrap();
        let b = init_memory_pool().unwrap();

        get_conn(&a)
            .unwrap()
            .execute("INSERT INTO movies (title) VALUES ('Alien')", [])
            .unwrap();

        assert_eq!(count_movies(&a), 1);
        assert_eq!(count_movies(&b), 0);
    }

    #[test]
    fn file_pool_persists_and_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.db");

        {
            let pool = init_pool(&path, 2).unwrap();
            assert_eq!(pool.max_size(), 2);
            get_conn(&pool)
                .unwrap()
                .execute("INSERT INTO movies (title) VALUES ('Heat')", [])
                .unwrap();
        }

        let pool = init_pool(&path, 2).unwrap();
        assert_eq!(count_movies(&pool), 1);

        let mode: String = get_conn(&pool)
            .unwrap()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn file_pool_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("catalog").join("movies.db");

        let pool = init_pool(&path, DEFAULT_MAX_CONNECTIONS).unwrap();
        assert_eq!(count_movies(&pool), 0);
        assert!(path.exists());
    }

    #[test]
    fn file_pool_zero_size_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_pool(&dir.path().join("movies.db"), 0).unwrap();
        assert_eq!(pool.max_size(), 1);
    }

    #[test]
    fn unusable_parent_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let err = init_pool(&blocker.join("movies.db"), 1).unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "got {err:?}");
    }
}
