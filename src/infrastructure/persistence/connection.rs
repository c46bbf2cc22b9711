//! SQLite pool creation and schema bootstrap

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS monsters (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        challenge_level INTEGER NOT NULL,
        source TEXT NOT NULL CHECK (source IN ('official', 'user')),
        owner_id TEXT,
        is_public INTEGER NOT NULL DEFAULT 0,
        types TEXT NOT NULL DEFAULT '[]',
        locations TEXT NOT NULL DEFAULT '[]',
        description TEXT,
        armor_class INTEGER,
        hit_points INTEGER
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_monsters_challenge_level ON monsters (challenge_level)",
    r#"
    CREATE TABLE IF NOT EXISTS encounter_tables (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        die_size INTEGER NOT NULL CHECK (die_size BETWEEN 2 AND 1000),
        filters TEXT NOT NULL DEFAULT '{}',
        is_public INTEGER NOT NULL DEFAULT 0,
        public_slug TEXT UNIQUE,
        compact_ranges INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_encounter_tables_owner ON encounter_tables (owner_id, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS encounter_table_entries (
        id TEXT PRIMARY KEY,
        table_id TEXT NOT NULL REFERENCES encounter_tables (id) ON DELETE CASCADE,
        roll_number INTEGER NOT NULL,
        roll_min INTEGER NOT NULL,
        roll_max INTEGER NOT NULL,
        monster_id TEXT,
        monster_snapshot TEXT NOT NULL,
        encounter_description TEXT NOT NULL,
        UNIQUE (table_id, roll_min)
    )
    "#,
];

/// Open a pool for `database_url`, creating the file and its directory if needed
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database URL: {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30));

    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to connect to SQLite database")?;
    tracing::info!("Connected to SQLite database: {}", database_url);
    Ok(pool)
}

/// Create tables and indexes that do not exist yet
pub async fn initialize_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Single-connection in-memory database with the schema applied
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    initialize_schema(&pool).await.unwrap();
    pool
}
