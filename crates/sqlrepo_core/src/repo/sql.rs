//! SQL text construction for table repositories.
//!
//! Table and column names are spliced into statement text, so they are
//! validated here before any statement is built.

use super::{RepoError, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static COLUMN_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid column name regex"));
static TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z_][A-Za-z0-9_]*\.)?[A-Za-z_][A-Za-z0-9_]*$")
        .expect("valid table name regex")
});

/// Statements a table repository executes, computed once per repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableStatements {
    pub insert: String,
    pub count: String,
    pub scan: String,
}

impl TableStatements {
    pub fn build<'a>(
        table: &str,
        columns: impl IntoIterator<Item = &'a str>,
    ) -> RepoResult<Self> {
        let columns = validate_columns(table, columns)?;
        Ok(Self {
            insert: insert_sql(table, &columns),
            count: format!("select count(*) from {table}"),
            scan: format!("select * from {table}"),
        })
    }
}

fn validate_table_name(table: &str) -> RepoResult<()> {
    if TABLE_NAME_RE.is_match(table) {
        Ok(())
    } else {
        Err(RepoError::InvalidIdentifier {
            kind: "table",
            value: table.to_string(),
        })
    }
}

fn validate_columns<'a>(
    table: &str,
    columns: impl IntoIterator<Item = &'a str>,
) -> RepoResult<Vec<&'a str>> {
    validate_table_name(table)?;

    let mut seen = HashSet::new();
    let mut validated = Vec::new();
    for column in columns {
        if !COLUMN_NAME_RE.is_match(column) {
            return Err(RepoError::InvalidIdentifier {
                kind: "column",
                value: column.to_string(),
            });
        }
        // SQLite identifiers are case-insensitive.
        if !seen.insert(column.to_ascii_lowercase()) {
            return Err(RepoError::DuplicateColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        validated.push(column);
    }

    if validated.is_empty() {
        return Err(RepoError::EmptyColumnMapping {
            table: table.to_string(),
        });
    }
    Ok(validated)
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "insert into {table} ({}) values ({placeholders})",
        columns.join(", ")
    )
}
