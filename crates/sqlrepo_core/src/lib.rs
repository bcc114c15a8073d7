//! Generic table repositories over pooled SQLite connections.
//! Used by test automation to persist and inspect entities during a run.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{
    open_pool, open_pool_in_memory, reset_tables, run_schema_script, ConnectionPool,
    ConnectionProvider, DbError, DbResult, PoolConfig,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::identity::UniquelyIdentified;
pub use model::user::User;
pub use repo::columns::{ColumnMapping, ValueExtractor};
pub use repo::table_repo::{
    BatchMode, InsertOnlyRepository, RepositoryOptions, RowDecoder, TableRepository,
};
pub use repo::user_repo::{
    decode_user_row, user_columns, user_repository, UserSqlRepository, USERS_SCHEMA_SQL,
    USERS_TABLE,
};
pub use repo::{ReadableSqlRepository, RepoError, RepoOperation, RepoResult, SqlRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
