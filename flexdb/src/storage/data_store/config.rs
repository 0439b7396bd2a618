//! Opening the database described by a [`DatabaseConfig`]

use std::{path::Path, str::FromStr};

use sqlx::{
    postgres::PgPoolOptions,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use super::types::Database;
use crate::config::DatabaseConfig;
use crate::storage::errors::StorageError;

impl Database {
    /// Connect to the configured database
    ///
    /// Connections are established eagerly so a misconfigured target fails at
    /// startup rather than on the first request.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        tracing::info!(kind = config.kind(), "Initializing database");

        let database = match config {
            DatabaseConfig::Memory { .. } => Self::Sqlite(open_sqlite_memory().await?),
            DatabaseConfig::File { path } => Self::Sqlite(open_sqlite_file(path).await?),
            DatabaseConfig::Server { url, .. } => Self::Postgres(
                PgPoolOptions::new()
                    .connect(url)
                    .await
                    .map_err(|e| StorageError::Connect(e.to_string()))?,
            ),
        };

        tracing::info!(
            kind = config.kind(),
            backend = database.backend(),
            "Database connection established"
        );

        Ok(database)
    }

    /// Fresh, empty in-memory database
    pub async fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::Sqlite(open_sqlite_memory().await?))
    }
}

// Every SQLite connection to `:memory:` gets its own database, so the pool is
// pinned to one connection that is never reaped.
async fn open_sqlite_memory() -> Result<sqlx::SqlitePool, StorageError> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| StorageError::Connect(e.to_string()))?;

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await
        .map_err(|e| StorageError::Connect(e.to_string()))
}

async fn open_sqlite_file(path: &Path) -> Result<sqlx::SqlitePool, StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .connect_with(opts)
        .await
        .map_err(|e| StorageError::Connect(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("flexdb-{tag}-{nanos}"))
    }

    #[tokio::test]
    async fn test_memory_database_is_usable() {
        let db = Database::connect(&DatabaseConfig::Memory {
            load_fixtures: false,
        })
        .await
        .expect("in-memory database should open");

        assert_eq!(db.backend(), "sqlite");
        assert!(db.as_sqlite().is_some());
        assert!(db.as_postgres().is_none());
        db.ping().await.expect("ping should succeed");
    }

    #[tokio::test]
    async fn test_memory_database_survives_across_queries() {
        let db = Database::in_memory().await.expect("open");
        let pool = db.as_sqlite().expect("sqlite pool");

        sqlx::query("CREATE TABLE t (v INTEGER)")
            .execute(pool)
            .await
            .expect("create");
        sqlx::query("INSERT INTO t (v) VALUES (42)")
            .execute(pool)
            .await
            .expect("insert");

        let v: i64 = sqlx::query_scalar("SELECT v FROM t")
            .fetch_one(pool)
            .await
            .expect("select");
        assert_eq!(v, 42);
    }

    #[tokio::test]
    async fn test_file_database_creates_missing_directory() {
        let dir = scratch_dir("file");
        let path = dir.join("nested").join("dev.db");
        assert!(!path.exists());

        let db = Database::connect(&DatabaseConfig::File { path: path.clone() })
            .await
            .expect("file database should open");
        db.ping().await.expect("ping should succeed");
        db.close().await;

        assert!(path.exists());
        assert!(db.is_closed());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_closed_database_fails_ping() {
        let db = Database::in_memory().await.expect("open");
        db.close().await;

        assert!(db.is_closed());
        assert!(db.ping().await.is_err());
    }
}
