// Connection and schema setup for the board database

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, error, info};

const REQUIRED_TABLES: [&str; 2] = ["projects", "tasks"];

/// Open a single-connection pool for the given database file.
///
/// The board is a single-user store: one connection, serialized by the
/// `BoardStore` lock.
pub async fn create_pool<P: AsRef<Path>>(database_path: P) -> Result<SqlitePool> {
    let path = database_path.as_ref();
    info!("Creating database connection for: {}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let connect_options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    connect(connect_options).await
}

/// Open a private in-memory database
pub async fn create_memory_pool() -> Result<SqlitePool> {
    let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    connect(connect_options).await
}

async fn connect(options: SqliteConnectOptions) -> Result<SqlitePool> {
    // The connection must never be recycled: an in-memory database lives and dies with it.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("Failed to open board database")?;

    debug!("Database connection established");
    Ok(pool)
}

/// Split the schema file into executable statements, dropping comments.
fn schema_statements(schema_sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current_statement = String::new();

    for line in schema_sql.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() || (trimmed.starts_with("--") && current_statement.is_empty()) {
            continue;
        }

        match trimmed.find("--") {
            Some(pos) => current_statement.push_str(&trimmed[..pos]),
            None => current_statement.push_str(trimmed),
        }
        current_statement.push(' ');

        if trimmed.ends_with(';') {
            let stmt = current_statement.trim().trim_end_matches(';').trim().to_string();
            if !stmt.is_empty() {
                statements.push(stmt);
            }
            current_statement.clear();
        }
    }

    statements
}

/// Create tables and indexes if they do not exist yet
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    info!("Creating board schema");

    let schema_sql = include_str!("../../migrations/001_initial_schema.sql");
    for statement in schema_statements(schema_sql) {
        debug!("Executing: {}", &statement[..statement.len().min(80)]);
        sqlx::query(&statement)
            .execute(pool)
            .await
            .with_context(|| {
                format!(
                    "Failed to execute schema statement: {}",
                    &statement[..statement.len().min(200)]
                )
            })?;
    }

    Ok(())
}

/// Check that every board table exists
pub async fn verify_schema(pool: &SqlitePool) -> Result<bool> {
    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('projects', 'tasks')",
    )
    .fetch_all(pool)
    .await
    .context("Failed to query table existence")?;

    let has_all_tables = tables.len() == REQUIRED_TABLES.len();
    if !has_all_tables {
        error!("Missing board tables. Found: {:?}", tables);
    }

    Ok(has_all_tables)
}

/// Create the schema on a fresh pool and verify it
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    create_schema(pool).await?;

    if !verify_schema(pool).await? {
        anyhow::bail!("Board schema verification failed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_schema_statements_skip_comments() {
        let sql = "-- header\nCREATE TABLE a (id INTEGER); -- trailing\n\n\
                   CREATE INDEX i ON a(id);\n";
        let statements = schema_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE a"));
        assert!(!statements[0].contains("trailing"));
    }

    #[tokio::test]
    async fn test_verify_schema_before_and_after_creation() {
        let pool = create_memory_pool().await.unwrap();
        assert!(!verify_schema(&pool).await.unwrap());

        initialize_database(&pool).await.unwrap();
        assert!(verify_schema(&pool).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_database_uses_wal() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("board.db");

        let pool = create_pool(&db_path).await.unwrap();
        initialize_database(&pool).await.unwrap();

        let journal_mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(journal_mode.0.to_lowercase(), "wal");
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_indexes_created() {
        let pool = create_memory_pool().await.unwrap();
        initialize_database(&pool).await.unwrap();

        let indexes: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(indexes.len(), 2);
    }
}
