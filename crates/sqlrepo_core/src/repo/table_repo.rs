//! Generic table repositories over a `ConnectionProvider`.
//!
//! # Responsibility
//! - Insert entity batches using an insert statement built once at construction.
//! - Count and scan whole tables when a row decoder is supplied.
//!
//! # Invariants
//! - Each call acquires exactly one connection and releases it before returning.
//! - Bind order always equals column mapping order.
//! - `BatchMode::Transactional` batches are all-or-nothing.
//!
//! # See also
//! - `repo::user_repo` for a concrete binding.

use super::columns::ColumnMapping;
use super::sql::TableStatements;
use super::{ReadableSqlRepository, RepoError, RepoOperation, RepoResult, SqlRepository};
use crate::db::{ConnectionPool, ConnectionProvider, DbError, DbResult};
use crate::logging::{sanitize_message, MAX_LOGGED_ERROR_CHARS};
use log::{debug, error, info};
use rusqlite::{params_from_iter, Connection, Row, Statement, TransactionBehavior};
use std::time::Instant;

/// Decodes one fetched row, reading columns by name, into an entity.
pub type RowDecoder<T> = fn(&Row<'_>) -> DbResult<T>;

/// How a batch insert reacts to a failing row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchMode {
    /// The batch runs in one immediate transaction; any failure rolls back
    /// every row of the batch.
    #[default]
    Transactional,
    /// Each row commits on its own; rows before a failing one stay inserted.
    AutoCommit,
}

/// Per-repository behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepositoryOptions {
    pub batch_mode: BatchMode,
}

/// Insert-only repository: the write capability of a table binding.
pub struct InsertOnlyRepository<T, P = ConnectionPool> {
    table: String,
    provider: P,
    columns: ColumnMapping<T>,
    statements: TableStatements,
    options: RepositoryOptions,
}

impl<T, P: ConnectionProvider> InsertOnlyRepository<T, P> {
    /// Builds a repository with default options.
    ///
    /// # Errors
    /// - `InvalidIdentifier` / `DuplicateColumn` / `EmptyColumnMapping` when the
    ///   binding cannot produce a safe insert statement.
    pub fn new(
        table: impl Into<String>,
        provider: P,
        columns: ColumnMapping<T>,
    ) -> RepoResult<Self> {
        Self::with_options(table, provider, columns, RepositoryOptions::default())
    }

    pub fn with_options(
        table: impl Into<String>,
        provider: P,
        columns: ColumnMapping<T>,
        options: RepositoryOptions,
    ) -> RepoResult<Self> {
        let table = table.into();
        let statements = TableStatements::build(&table, columns.names())?;
        debug!(
            "event=repo_init module=repo status=ok table={} columns={} batch_mode={:?} insert_sql={}",
            table,
            columns.len(),
            options.batch_mode,
            statements.insert
        );

        Ok(Self {
            table,
            provider,
            columns,
            statements,
            options,
        })
    }

    /// Adds read capability by supplying the row decoder.
    pub fn with_row_decoder(self, decoder: RowDecoder<T>) -> TableRepository<T, P> {
        TableRepository {
            writer: self,
            decoder,
        }
    }

    /// The parameterized insert statement used for every batch.
    pub fn insert_sql(&self) -> &str {
        &self.statements.insert
    }

    pub fn options(&self) -> RepositoryOptions {
        self.options
    }

    fn insert_transactional(&self, conn: &mut Connection, elements: &[T]) -> DbResult<()> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare_cached(&self.statements.insert)?;
            self.execute_rows(&mut stmt, elements)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn insert_autocommit(&self, conn: &Connection, elements: &[T]) -> DbResult<()> {
        let mut stmt = conn.prepare_cached(&self.statements.insert)?;
        self.execute_rows(&mut stmt, elements)
    }

    fn execute_rows(&self, stmt: &mut Statement<'_>, elements: &[T]) -> DbResult<()> {
        for element in elements {
            stmt.execute(params_from_iter(self.columns.values(element)))?;
        }
        Ok(())
    }

    /// Logs the outcome of `operation` and wraps failures as data-access errors.
    fn finish<R>(
        &self,
        operation: RepoOperation,
        started_at: Instant,
        rows: impl FnOnce(&R) -> usize,
        result: DbResult<R>,
    ) -> RepoResult<R> {
        match result {
            Ok(value) => {
                info!(
                    "event=repo_{} module=repo status=ok table={} rows={} duration_ms={}",
                    operation,
                    self.table,
                    rows(&value),
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                error!(
                    "event=repo_{} module=repo status=error table={} duration_ms={} error={}",
                    operation,
                    self.table,
                    started_at.elapsed().as_millis(),
                    sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
                );
                Err(RepoError::DataAccess {
                    operation,
                    table: self.table.clone(),
                    source: err,
                })
            }
        }
    }
}

impl<T, P: ConnectionProvider> SqlRepository<T> for InsertOnlyRepository<T, P> {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn insert_elements(&self, elements: Option<&[T]>) -> RepoResult<()> {
        let elements = elements.unwrap_or_default();
        let started_at = Instant::now();

        let result = self
            .provider
            .acquire()
            .and_then(|mut conn| match self.options.batch_mode {
                BatchMode::Transactional => self.insert_transactional(&mut conn, elements),
                BatchMode::AutoCommit => self.insert_autocommit(&conn, elements),
            });

        self.finish(
            RepoOperation::Insert,
            started_at,
            |_| elements.len(),
            result,
        )
    }
}

/// Read/write repository: insert-only capability plus a row decoder.
pub struct TableRepository<T, P = ConnectionPool> {
    writer: InsertOnlyRepository<T, P>,
    decoder: RowDecoder<T>,
}

impl<T, P: ConnectionProvider> TableRepository<T, P> {
    /// Builds a read/write repository with default options.
    pub fn new(
        table: impl Into<String>,
        provider: P,
        columns: ColumnMapping<T>,
        decoder: RowDecoder<T>,
    ) -> RepoResult<Self> {
        Ok(InsertOnlyRepository::new(table, provider, columns)?.with_row_decoder(decoder))
    }

    pub fn with_options(
        table: impl Into<String>,
        provider: P,
        columns: ColumnMapping<T>,
        decoder: RowDecoder<T>,
        options: RepositoryOptions,
    ) -> RepoResult<Self> {
        Ok(
            InsertOnlyRepository::with_options(table, provider, columns, options)?
                .with_row_decoder(decoder),
        )
    }

    /// The parameterized insert statement used for every batch.
    pub fn insert_sql(&self) -> &str {
        self.writer.insert_sql()
    }

    /// Drops the read capability.
    pub fn into_insert_only(self) -> InsertOnlyRepository<T, P> {
        self.writer
    }

    fn count_rows(&self, conn: &Connection) -> DbResult<u64> {
        let sql = &self.writer.statements.count;
        let mut stmt = conn.prepare_cached(sql)?;
        let mut rows = stmt.query([])?;
        let row = rows
            .next()?
            .ok_or_else(|| DbError::InvalidData(format!("`{sql}` returned no rows")))?;
        let count: i64 = row.get(0)?;
        u64::try_from(count)
            .map_err(|_| DbError::InvalidData(format!("`{sql}` returned negative count {count}")))
    }

    fn scan_rows(&self, conn: &Connection) -> DbResult<Vec<T>> {
        let mut stmt = conn.prepare_cached(&self.writer.statements.scan)?;
        let mut rows = stmt.query([])?;
        let mut elements = Vec::new();

        while let Some(row) = rows.next()? {
            elements.push((self.decoder)(row)?);
        }

        Ok(elements)
    }
}

impl<T, P: ConnectionProvider> SqlRepository<T> for TableRepository<T, P> {
    fn table_name(&self) -> &str {
        self.writer.table_name()
    }

    fn insert_elements(&self, elements: Option<&[T]>) -> RepoResult<()> {
        self.writer.insert_elements(elements)
    }
}

impl<T, P: ConnectionProvider> ReadableSqlRepository<T> for TableRepository<T, P> {
    fn count_all(&self) -> RepoResult<u64> {
        let started_at = Instant::now();
        let result = self
            .writer
            .provider
            .acquire()
            .and_then(|conn| self.count_rows(&conn));

        self.writer
            .finish(RepoOperation::Count, started_at, |_| 1, result)
    }

    fn find_all(&self) -> RepoResult<Vec<T>> {
        let started_at = Instant::now();
        let result = self
            .writer
            .provider
            .acquire()
            .and_then(|conn| self.scan_rows(&conn));

        self.writer
            .finish(RepoOperation::Scan, started_at, Vec::len, result)
    }
}
