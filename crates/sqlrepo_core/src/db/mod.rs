//! SQLite connection provisioning and driver-level errors.
//!
//! # Responsibility
//! - Define the `ConnectionProvider` seam repositories acquire connections from.
//! - Open pooled SQLite databases (file-backed or shared in-memory).
//! - Offer caller-owned schema/reset helpers for test setups.
//!
//! # Invariants
//! - A connection acquired from a provider is released when its guard drops.
//! - Schema lifecycle stays outside repositories; they never create tables.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::DerefMut;

mod pool;
mod script;

pub use pool::{open_pool, open_pool_in_memory, ConnectionPool, PoolConfig, PooledConnection};
pub use script::{reset_tables, run_schema_script};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Pool(r2d2::Error),
    InvalidData(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Pool(err) => write!(f, "connection pool error: {err}"),
            Self::InvalidData(message) => write!(f, "invalid data: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Pool(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<r2d2::Error> for DbError {
    fn from(value: r2d2::Error) -> Self {
        Self::Pool(value)
    }
}

/// Source of blocking SQLite connections.
///
/// Each call to [`ConnectionProvider::acquire`] hands out one scoped guard;
/// dropping the guard returns the connection to its owner.
pub trait ConnectionProvider {
    type Conn<'a>: DerefMut<Target = Connection>
    where
        Self: 'a;

    fn acquire(&self) -> DbResult<Self::Conn<'_>>;
}

impl ConnectionProvider for ConnectionPool {
    type Conn<'a> = PooledConnection;

    fn acquire(&self) -> DbResult<Self::Conn<'_>> {
        Ok(self.get()?)
    }
}
