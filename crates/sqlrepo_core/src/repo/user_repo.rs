//! `users` table binding for the `User` entity.

use super::columns::ColumnMapping;
use super::table_repo::TableRepository;
use super::RepoResult;
use crate::db::{ConnectionPool, ConnectionProvider, DbResult};
use crate::model::user::User;
use rusqlite::types::Value;
use rusqlite::Row;

pub const USERS_TABLE: &str = "users";

/// Schema script creating the `users` table.
pub const USERS_SCHEMA_SQL: &str = include_str!("users_schema.sql");

pub type UserSqlRepository<P = ConnectionPool> = TableRepository<User, P>;

/// Builds the read/write `users` repository over `provider`.
pub fn user_repository<P: ConnectionProvider>(provider: P) -> RepoResult<UserSqlRepository<P>> {
    TableRepository::new(USERS_TABLE, provider, user_columns(), decode_user_row)
}

pub fn user_columns() -> ColumnMapping<User> {
    ColumnMapping::new()
        .column("id", |user: &User| Value::Integer(user.id))
        .column("first_name", |user: &User| Value::Text(user.first_name.clone()))
        .column("last_name", |user: &User| Value::Text(user.last_name.clone()))
        .column("email", |user: &User| Value::Text(user.email.clone()))
}

pub fn decode_user_row(row: &Row<'_>) -> DbResult<User> {
    Ok(User {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
    })
}
