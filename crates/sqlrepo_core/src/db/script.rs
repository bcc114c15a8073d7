//! Schema bootstrap and table reset helpers for test setups.
//!
//! # Responsibility
//! - Run caller-supplied schema scripts on one acquired connection.
//! - Clear every user table between test cases.
//!
//! # Invariants
//! - Helpers never own the provider; the caller controls its lifecycle.
//! - `reset_tables` restores `foreign_keys` to its previous value, even on error.

use super::{ConnectionProvider, DbResult};
use crate::logging::{sanitize_message, MAX_LOGGED_ERROR_CHARS};
use log::{error, info, warn};
use rusqlite::Connection;
use std::time::Instant;

/// Executes a multi-statement schema script.
pub fn run_schema_script<P: ConnectionProvider>(provider: &P, sql: &str) -> DbResult<()> {
    let started_at = Instant::now();
    let result = provider
        .acquire()
        .and_then(|conn| conn.execute_batch(sql).map_err(Into::into));

    match &result {
        Ok(()) => info!(
            "event=schema_script module=db status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=schema_script module=db status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
        ),
    }
    result
}

/// Deletes all rows from every user table and returns the cleared table names,
/// sorted by name.
///
/// Foreign key enforcement is suspended while deleting so that tables can be
/// cleared in any order.
pub fn reset_tables<P: ConnectionProvider>(provider: &P) -> DbResult<Vec<String>> {
    let started_at = Instant::now();
    let result = provider.acquire().and_then(|conn| clear_user_tables(&conn));

    match &result {
        Ok(tables) => info!(
            "event=reset_tables module=db status=ok tables={} duration_ms={}",
            tables.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=reset_tables module=db status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
        ),
    }
    result
}

fn clear_user_tables(conn: &Connection) -> DbResult<Vec<String>> {
    let foreign_keys: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
    conn.execute_batch("PRAGMA foreign_keys = OFF;")?;

    let cleared = delete_all_rows(conn);

    let restore = if foreign_keys == 1 {
        "PRAGMA foreign_keys = ON;"
    } else {
        "PRAGMA foreign_keys = OFF;"
    };
    match (cleared, conn.execute_batch(restore)) {
        (Err(err), restored) => {
            if let Err(restore_err) = restored {
                warn!(
                    "event=reset_tables module=db status=error error_code=foreign_keys_restore_failed error={}",
                    sanitize_message(&restore_err.to_string(), MAX_LOGGED_ERROR_CHARS)
                );
            }
            Err(err)
        }
        (Ok(_), Err(restore_err)) => Err(restore_err.into()),
        (Ok(tables), Ok(())) => Ok(tables),
    }
}

fn delete_all_rows(conn: &Connection) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name
         FROM sqlite_master
         WHERE type = 'table'
           AND name NOT LIKE 'sqlite_%'
         ORDER BY name;",
    )?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    for table in &tables {
        conn.execute(&format!("DELETE FROM \"{}\";", table.replace('"', "\"\"")), [])?;
    }

    Ok(tables)
}
