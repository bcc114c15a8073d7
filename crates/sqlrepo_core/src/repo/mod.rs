//! Table-backed repository contracts and the generic SQLite implementation.
//!
//! # Responsibility
//! - Define the write-only and read/write repository capability sets.
//! - Turn a table name plus column mapping into batched inserts and full scans.
//! - Bind concrete entities (`users`) to the generic implementation.
//!
//! # Invariants
//! - Every runtime failure is logged with operation and table, then returned
//!   as `RepoError::DataAccess` carrying the driver cause.
//! - Repositories hold no mutable state; SQL text is computed at construction.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod columns;
mod sql;
pub mod table_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository operation that touched the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoOperation {
    Insert,
    Count,
    Scan,
}

impl RepoOperation {
    /// Stable name used in log events and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Count => "count",
            Self::Scan => "scan",
        }
    }
}

impl Display for RepoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository error.
///
/// Construction rejects unsafe or inconsistent bindings; once built, a
/// repository only ever fails with [`RepoError::DataAccess`].
#[derive(Debug)]
pub enum RepoError {
    /// Table or column name is not a plain SQL identifier.
    InvalidIdentifier { kind: &'static str, value: String },
    /// The same column appears twice in one mapping.
    DuplicateColumn { table: String, column: String },
    /// A repository needs at least one column to insert.
    EmptyColumnMapping { table: String },
    /// Connection, statement, execution or decoding failure.
    DataAccess {
        operation: RepoOperation,
        table: String,
        source: DbError,
    },
}

impl RepoError {
    /// Returns the operation of a data-access failure.
    pub fn operation(&self) -> Option<RepoOperation> {
        match self {
            Self::DataAccess { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier { kind, value } => {
                write!(f, "invalid {kind} name `{value}`")
            }
            Self::DuplicateColumn { table, column } => {
                write!(f, "column `{column}` is mapped twice for table `{table}`")
            }
            Self::EmptyColumnMapping { table } => {
                write!(f, "column mapping for table `{table}` is empty")
            }
            Self::DataAccess {
                operation,
                table,
                source,
            } => write!(f, "{operation} on table `{table}` failed: {source}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DataAccess { source, .. } => Some(source),
            Self::InvalidIdentifier { .. }
            | Self::DuplicateColumn { .. }
            | Self::EmptyColumnMapping { .. } => None,
        }
    }
}

/// Write half of a table repository.
pub trait SqlRepository<T> {
    /// Name of the table this repository writes to.
    fn table_name(&self) -> &str;

    /// Inserts all `elements` as one batch. `None` behaves like an empty slice.
    fn insert_elements(&self, elements: Option<&[T]>) -> RepoResult<()>;
}

/// Read/write table repository, available when rows can be decoded back.
pub trait ReadableSqlRepository<T>: SqlRepository<T> {
    /// Counts every row of the table.
    fn count_all(&self) -> RepoResult<u64>;

    /// Returns every row of the table in engine order.
    fn find_all(&self) -> RepoResult<Vec<T>>;
}
