use sqlrepo_core::{
    open_pool_in_memory, reset_tables, run_schema_script, user_repository, ConnectionPool,
    PoolConfig, ReadableSqlRepository, SqlRepository, UniquelyIdentified, User, USERS_SCHEMA_SQL,
};
use std::collections::HashSet;

fn users_pool() -> ConnectionPool {
    let pool = open_pool_in_memory(&PoolConfig::default()).unwrap();
    run_schema_script(&pool, USERS_SCHEMA_SQL).unwrap();
    pool
}

fn sample_users() -> Vec<User> {
    vec![
        User::new(1, "Test", "Test", "test.test@test.com"),
        User::new(2, "Also", "Test", "also.test@test.com"),
        User::new(3, "Other", "Test", "other.test@test.com"),
    ]
}

fn as_set(users: Vec<User>) -> HashSet<User> {
    users.into_iter().collect()
}

#[test]
fn insert_none_leaves_table_empty() {
    let pool = users_pool();
    let repo = user_repository(pool.clone()).unwrap();

    repo.insert_elements(None).unwrap();

    assert_eq!(repo.count_all().unwrap(), 0);
    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn insert_empty_slice_leaves_table_empty() {
    let pool = users_pool();
    let repo = user_repository(pool.clone()).unwrap();

    repo.insert_elements(Some(&[])).unwrap();

    assert_eq!(repo.count_all().unwrap(), 0);
    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn insert_single_user_round_trips() {
    let pool = users_pool();
    let repo = user_repository(pool.clone()).unwrap();
    let user = User::new(1, "Test", "Test", "test.test@test.com");

    repo.insert_elements(Some(&[user.clone()])).unwrap();

    assert_eq!(repo.find_all().unwrap(), vec![user]);
    assert_eq!(repo.count_all().unwrap(), 1);
}

#[test]
fn insert_several_users_returns_same_elements() {
    let pool = users_pool();
    let repo = user_repository(pool.clone()).unwrap();
    let users = sample_users();

    repo.insert_elements(Some(users.as_slice())).unwrap();

    assert_eq!(repo.count_all().unwrap(), 3);
    assert_eq!(as_set(repo.find_all().unwrap()), as_set(users));
}

#[test]
fn count_accumulates_across_batches() {
    let pool = users_pool();
    let repo = user_repository(pool.clone()).unwrap();
    let users = sample_users();

    assert_eq!(repo.count_all().unwrap(), 0);
    repo.insert_elements(Some(&users[..1])).unwrap();
    assert_eq!(repo.count_all().unwrap(), 1);
    repo.insert_elements(None).unwrap();
    repo.insert_elements(Some(&users[1..])).unwrap();
    assert_eq!(repo.count_all().unwrap(), 3);
}

#[test]
fn rows_written_outside_the_repository_are_decoded() {
    let pool = users_pool();
    run_schema_script(
        &pool,
        "INSERT INTO users (id, first_name, last_name, email)
         VALUES (42, 'Grace', 'Hopper', 'grace@example.com');",
    )
    .unwrap();
    let repo = user_repository(pool.clone()).unwrap();

    let users = repo.find_all().unwrap();
    assert_eq!(
        users,
        vec![User::new(42, "Grace", "Hopper", "grace@example.com")]
    );
    assert_eq!(users[0].unique_key(), "grace@example.com");
}

#[test]
fn reset_tables_empties_users_between_cases() {
    let pool = users_pool();
    let repo = user_repository(pool.clone()).unwrap();
    repo.insert_elements(Some(sample_users().as_slice())).unwrap();

    let cleared = reset_tables(&pool).unwrap();

    assert_eq!(cleared, vec![repo.table_name().to_string()]);
    assert_eq!(repo.count_all().unwrap(), 0);
}

#[test]
fn insert_sql_lists_user_columns_in_order() {
    let pool = users_pool();
    let repo = user_repository(pool).unwrap();

    assert_eq!(repo.table_name(), "users");
    assert_eq!(
        repo.insert_sql(),
        "insert into users (id, first_name, last_name, email) values (?, ?, ?, ?)"
    );
}
