//! Startup sequence: connect, prepare schema, seed

use thiserror::Error;

use crate::config::{AppEnv, DatabaseConfig};
use crate::storage::{Database, StorageError};
use crate::userdb::{UserError, UserStore, load_fixtures};

#[derive(Debug, Error)]
pub enum InitError {
    #[error("Database connection failed: {0}")]
    Storage(#[from] StorageError),

    #[error("User table initialization failed: {0}")]
    Schema(#[from] UserError),
}

/// Open the configured database and make it ready to serve requests
///
/// Fixtures are applied per target: memory and server databases when their
/// config asks for it, file databases when the file is new or the users table
/// is empty.
pub async fn init(config: &DatabaseConfig, env: &AppEnv) -> Result<Database, InitError> {
    let file_is_new = match config {
        DatabaseConfig::File { path } => !tokio::fs::try_exists(path).await.unwrap_or(false),
        _ => false,
    };

    let db = Database::connect(config).await?;
    UserStore::init(&db, env).await?;

    let seed = match config {
        DatabaseConfig::Memory { load_fixtures } => *load_fixtures,
        DatabaseConfig::File { .. } => file_is_new || UserStore::count(&db).await? == 0,
        DatabaseConfig::Server { load_fixtures, .. } => *load_fixtures,
    };

    if seed {
        load_fixtures(&db, env).await;
    } else {
        tracing::debug!(kind = config.kind(), "Skipping user fixtures");
    }

    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::userdb::{FIXTURE_USERS, UserRepository};

    #[tokio::test]
    async fn test_memory_with_fixtures() {
        let db = init(&DatabaseConfig::Memory { load_fixtures: true }, &AppEnv::Test)
            .await
            .expect("init");

        assert_eq!(
            UserStore::count(&db).await.expect("count"),
            FIXTURE_USERS.len() as i64
        );
    }

    #[tokio::test]
    async fn test_memory_without_fixtures() {
        let db = init(&DatabaseConfig::Memory { load_fixtures: false }, &AppEnv::Test)
            .await
            .expect("init");

        assert_eq!(UserStore::count(&db).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn test_new_file_database_is_seeded_once() {
        let dir = std::env::temp_dir().join(format!(
            "flexdb-bootstrap-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let config = DatabaseConfig::File {
            path: dir.join("nested").join("dev.db"),
        };

        let db = init(&config, &AppEnv::Development).await.expect("init");
        assert_eq!(UserStore::count(&db).await.expect("count"), 3);

        // Remove a seeded row; a restart must not bring it back
        UserStore::for_database(&db)
            .delete(1)
            .await
            .expect("delete");
        db.close().await;

        let db = init(&config, &AppEnv::Development).await.expect("reinit");
        assert_eq!(UserStore::count(&db).await.expect("count"), 2);
        db.close().await;

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_production_file_database_is_never_seeded() {
        let dir = std::env::temp_dir().join(format!(
            "flexdb-bootstrap-prod-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let config = DatabaseConfig::File {
            path: dir.join("prod.db"),
        };

        // Production never creates the table, so the fresh file fails validation
        let result = init(&config, &AppEnv::Production).await;
        assert!(matches!(result, Err(InitError::Schema(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
