//! CLI smoke entry point.
//!
//! # Responsibility
//! - Exercise `sqlrepo_core` end to end against a throwaway in-memory database.
//! - Keep output deterministic for quick local sanity checks.

use log::error;
use sqlrepo_core::{
    core_version, init_logging, open_pool_in_memory, run_schema_script, user_repository,
    LoggingConfig, PoolConfig, ReadableSqlRepository, SqlRepository, UniquelyIdentified, User,
    USERS_SCHEMA_SQL,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = init_logging(&LoggingConfig::default()) {
        eprintln!("logging disabled: {err}");
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("sqlrepo smoke check failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!("sqlrepo_core version={}", core_version());

    let pool = open_pool_in_memory(&PoolConfig::default())?;
    run_schema_script(&pool, USERS_SCHEMA_SQL)?;
    let repo = user_repository(pool)?;

    let users = [
        User::new(1, "Test", "Test", "test.test@test.com"),
        User::new(2, "Also", "Test", "also.test@test.com"),
        User::new(3, "Other", "Test", "other.test@test.com"),
    ];
    repo.insert_elements(Some(&users))?;

    println!("table={} count={}", repo.table_name(), repo.count_all()?);
    let mut keys = repo
        .find_all()?
        .iter()
        .map(|user| user.unique_key().to_string())
        .collect::<Vec<_>>();
    keys.sort();
    for key in keys {
        println!("user={key}");
    }
    Ok(())
}
