use std::str::FromStr;

use anyhow::Context;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

// Schema is applied idempotently at startup. The UNIQUE constraints back up
// the check-then-insert transactions in the handlers: a racing writer hits a
// constraint error instead of breaking an invariant.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        employee_id TEXT NOT NULL UNIQUE,
        created_at DATETIME NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        check_in DATETIME NOT NULL,
        check_out DATETIME,
        date DATE NOT NULL,
        status TEXT NOT NULL DEFAULT 'present',
        UNIQUE (user_id, date)
    )
    "#,
];

pub async fn init_db(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .context("Invalid DATABASE_URL")?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options)
        .await
        .context("Failed to connect to database")?;

    create_tables(&pool).await?;

    Ok(pool)
}

async fn create_tables(pool: &SqlitePool) -> anyhow::Result<()> {
    for ddl in SCHEMA {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .context("Failed to create tables")?;
    }
    Ok(())
}

/// In-memory database for tests. Capped at a single connection so every
/// request in a test sees the same `:memory:` instance.
#[cfg(test)]
pub async fn init_test_db() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    create_tables(&pool).await.unwrap();
    pool
}
