//! Pooled SQLite connection bootstrap.
//!
//! # Responsibility
//! - Build r2d2 pools over file-backed or in-memory SQLite databases.
//! - Apply per-connection pragmas every time the pool opens a connection.
//!
//! # Invariants
//! - Every pooled connection has `busy_timeout` set and `foreign_keys` configured.
//! - All connections of one in-memory pool share a single database and may be
//!   used from several threads at once.
//! - Two in-memory pools never share a database.

use super::DbResult;
use log::{error, info};
use r2d2::{CustomizeConnection, Pool};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub type ConnectionPool = Pool<SqliteConnectionManager>;

pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pool tuning knobs. Missing fields fall back to [`PoolConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of pooled connections.
    pub pool_size: u32,
    /// SQLite busy handler timeout, applied to each connection.
    pub busy_timeout_ms: u64,
    /// How long `acquire` waits for a free connection before failing.
    pub connection_timeout_ms: u64,
    /// Enforce foreign key constraints on each connection.
    pub foreign_keys: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout_ms: 5_000,
            connection_timeout_ms: 5_000,
            foreign_keys: true,
        }
    }
}

#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout: Duration,
    foreign_keys: bool,
    wal: bool,
}

impl CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.busy_timeout(self.busy_timeout)?;
        conn.execute_batch(if self.foreign_keys {
            "PRAGMA foreign_keys = ON;"
        } else {
            "PRAGMA foreign_keys = OFF;"
        })?;
        if self.wal {
            // journal_mode reports the resulting mode as a row.
            conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get::<_, String>(0))?;
        }
        Ok(())
    }
}

/// Opens a pool over a SQLite database file, creating the file when missing.
///
/// # Side effects
/// - Opens `pool_size` connections eagerly.
/// - Emits `pool_open` logging events with duration and status.
pub fn open_pool(path: impl AsRef<Path>, config: &PoolConfig) -> DbResult<ConnectionPool> {
    let manager = SqliteConnectionManager::file(path.as_ref());
    build_pool(manager, config, "file", true)
}

/// Opens a pool over a fresh in-memory database.
///
/// The database lives in the `memdb` VFS under a name unique to this call, so
/// every connection of the returned pool sees the same tables. `memdb` uses
/// regular file locking, so concurrent writers wait on `busy_timeout` instead
/// of failing with `SQLITE_LOCKED`. The database lives as long as the pool
/// keeps at least one connection open; idle reaping is disabled for that reason.
pub fn open_pool_in_memory(config: &PoolConfig) -> DbResult<ConnectionPool> {
    let uri = format!("file:/sqlrepo-{}?vfs=memdb", Uuid::new_v4());
    let manager = SqliteConnectionManager::file(uri).with_flags(
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    );
    build_pool(manager, config, "memory", false)
}

fn build_pool(
    manager: SqliteConnectionManager,
    config: &PoolConfig,
    mode: &str,
    wal: bool,
) -> DbResult<ConnectionPool> {
    let started_at = Instant::now();
    info!(
        "event=pool_open module=db status=start mode={} pool_size={}",
        mode, config.pool_size
    );

    let mut builder = Pool::builder()
        .max_size(config.pool_size.max(1))
        .connection_timeout(Duration::from_millis(config.connection_timeout_ms))
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
            foreign_keys: config.foreign_keys,
            wal,
        }));
    if !wal {
        builder = builder.idle_timeout(None).max_lifetime(None);
    }

    match builder.build(manager) {
        Ok(pool) => {
            info!(
                "event=pool_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(pool)
        }
        Err(err) => {
            error!(
                "event=pool_open module=db status=error mode={} duration_ms={} error_code=pool_build_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{open_pool, open_pool_in_memory, PoolConfig};

    fn pragma_i64(conn: &rusqlite::Connection, name: &str) -> i64 {
        conn.query_row(&format!("PRAGMA {name};"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn in_memory_pool_connections_share_one_database() {
        let pool = open_pool_in_memory(&PoolConfig::default()).unwrap();
        let first = pool.get().unwrap();
        let second = pool.get().unwrap();

        first
            .execute_batch("CREATE TABLE shared_marker (id INTEGER PRIMARY KEY);")
            .unwrap();
        let count: i64 = second
            .query_row("SELECT COUNT(*) FROM shared_marker;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn in_memory_pool_waits_for_concurrent_writers() {
        let pool = open_pool_in_memory(&PoolConfig::default()).unwrap();
        pool.get()
            .unwrap()
            .execute_batch("CREATE TABLE ticks (writer INTEGER NOT NULL, n INTEGER NOT NULL);")
            .unwrap();

        std::thread::scope(|scope| {
            for writer in 0..4_i64 {
                let pool = &pool;
                scope.spawn(move || {
                    for n in 0..50_i64 {
                        let conn = pool.get().unwrap();
                        conn.execute(
                            "INSERT INTO ticks (writer, n) VALUES (?1, ?2);",
                            [writer, n],
                        )
                        .unwrap();
                        let _: i64 = conn
                            .query_row("SELECT COUNT(*) FROM ticks;", [], |row| row.get(0))
                            .unwrap();
                    }
                });
            }
        });

        let total: i64 = pool
            .get()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM ticks;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(total, 200);
    }

    #[test]
    fn in_memory_pools_are_isolated_from_each_other() {
        let pool_a = open_pool_in_memory(&PoolConfig::default()).unwrap();
        let pool_b = open_pool_in_memory(&PoolConfig::default()).unwrap();

        pool_a
            .get()
            .unwrap()
            .execute_batch("CREATE TABLE only_in_a (id INTEGER);")
            .unwrap();
        let err = pool_b
            .get()
            .unwrap()
            .execute_batch("SELECT * FROM only_in_a;")
            .unwrap_err();
        assert!(err.to_string().contains("only_in_a"));
    }

    #[test]
    fn pooled_connections_receive_configured_pragmas() {
        let config = PoolConfig {
            pool_size: 2,
            busy_timeout_ms: 1_234,
            ..PoolConfig::default()
        };
        let pool = open_pool_in_memory(&config).unwrap();
        let conn = pool.get().unwrap();

        assert_eq!(pragma_i64(&conn, "foreign_keys"), 1);
        assert_eq!(pragma_i64(&conn, "busy_timeout"), 1_234);
    }

    #[test]
    fn file_pool_enables_wal_journal() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(dir.path().join("repo.db"), &PoolConfig::default()).unwrap();
        let conn = pool.get().unwrap();

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(journal_mode, "wal");
    }

    #[test]
    fn pool_config_deserializes_with_defaults_for_missing_fields() {
        let config: PoolConfig =
            serde_json::from_str(r#"{ "pool_size": 2, "foreign_keys": false }"#).unwrap();

        assert_eq!(config.pool_size, 2);
        assert!(!config.foreign_keys);
        assert_eq!(config.busy_timeout_ms, PoolConfig::default().busy_timeout_ms);
        assert_eq!(
            config.connection_timeout_ms,
            PoolConfig::default().connection_timeout_ms
        );
    }
}
