use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Sqlite};

use crate::config::AppEnv;
use crate::storage::Database;
use crate::userdb::{
    errors::UserError,
    types::{NewUser, User, UserChanges},
};

use super::postgres::*;
use super::sqlite::*;

/// Storage port for user records
///
/// The service layer depends only on this trait; each backing engine provides
/// its own implementation.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, newest first
    async fn find_all(&self) -> Result<Vec<User>, UserError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError>;

    /// Fails with [`UserError::UniqueViolation`] when the email is taken
    async fn insert(&self, user: NewUser) -> Result<User, UserError>;

    /// Applies only the provided fields and refreshes `updated_at`
    async fn update(&self, id: i64, changes: UserChanges) -> Result<User, UserError>;

    /// Fails with [`UserError::NotFound`] when no row has this id
    async fn delete(&self, id: i64) -> Result<(), UserError>;
}

/// Users stored in SQLite, either in memory or in a file
#[derive(Clone, Debug)]
pub struct SqliteUserStore {
    pool: Pool<Sqlite>,
}

impl SqliteUserStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserStore {
    async fn find_all(&self) -> Result<Vec<User>, UserError> {
        get_all_users_sqlite(&self.pool).await
    }

    #[tracing::instrument(skip(self), fields(user_id = id))]
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let result = get_user_sqlite(&self.pool, id).await;
        log_lookup(&result);
        result
    }

    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, user: NewUser) -> Result<User, UserError> {
        let result = insert_user_sqlite(&self.pool, user).await;
        log_write("insert", &result);
        result
    }

    #[tracing::instrument(skip(self, changes), fields(user_id = id))]
    async fn update(&self, id: i64, changes: UserChanges) -> Result<User, UserError> {
        let result = update_user_sqlite(&self.pool, id, changes).await;
        log_write("update", &result);
        result
    }

    #[tracing::instrument(skip(self), fields(user_id = id))]
    async fn delete(&self, id: i64) -> Result<(), UserError> {
        delete_user_sqlite(&self.pool, id).await
    }
}

/// Users stored on a PostgreSQL server
#[derive(Clone, Debug)]
pub struct PostgresUserStore {
    pool: Pool<Postgres>,
}

impl PostgresUserStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserStore {
    async fn find_all(&self) -> Result<Vec<User>, UserError> {
        get_all_users_postgres(&self.pool).await
    }

    #[tracing::instrument(skip(self), fields(user_id = id))]
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let result = get_user_postgres(&self.pool, id).await;
        log_lookup(&result);
        result
    }

    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, user: NewUser) -> Result<User, UserError> {
        let result = insert_user_postgres(&self.pool, user).await;
        log_write("insert", &result);
        result
    }

    #[tracing::instrument(skip(self, changes), fields(user_id = id))]
    async fn update(&self, id: i64, changes: UserChanges) -> Result<User, UserError> {
        let result = update_user_postgres(&self.pool, id, changes).await;
        log_write("update", &result);
        result
    }

    #[tracing::instrument(skip(self), fields(user_id = id))]
    async fn delete(&self, id: i64) -> Result<(), UserError> {
        delete_user_postgres(&self.pool, id).await
    }
}

fn log_lookup(result: &Result<Option<User>, UserError>) {
    match result {
        Ok(Some(_)) => tracing::debug!(found = true, "User lookup completed"),
        Ok(None) => tracing::debug!(found = false, "User lookup completed - not found"),
        Err(e) => tracing::error!(error = %e, "User lookup failed"),
    }
}

fn log_write(operation: &'static str, result: &Result<User, UserError>) {
    match result {
        Ok(user) => tracing::info!(operation, user_id = user.id, "User write completed"),
        Err(UserError::NotFound) => tracing::debug!(operation, "User write target not found"),
        Err(UserError::UniqueViolation(_)) => {
            tracing::info!(operation, "User write rejected: email already in use")
        }
        Err(e) => tracing::error!(operation, error = %e, "User write failed"),
    }
}

/// Schema management and repository construction for a [`Database`]
pub struct UserStore;

impl UserStore {
    /// Prepare the users table
    ///
    /// Outside production the table is created when missing. In every
    /// environment the live schema is then checked against the expected columns.
    pub async fn init(db: &Database, env: &AppEnv) -> Result<(), UserError> {
        match db {
            Database::Sqlite(pool) => {
                if !env.is_production() {
                    create_tables_sqlite(pool).await?;
                }
                validate_user_tables_sqlite(pool).await
            }
            Database::Postgres(pool) => {
                if !env.is_production() {
                    create_tables_postgres(pool).await?;
                }
                validate_user_tables_postgres(pool).await
            }
        }
    }

    /// Repository backed by the given database
    pub fn for_database(db: &Database) -> Arc<dyn UserRepository> {
        match db {
            Database::Sqlite(pool) => Arc::new(SqliteUserStore::new(pool.clone())),
            Database::Postgres(pool) => Arc::new(PostgresUserStore::new(pool.clone())),
        }
    }

    pub async fn count(db: &Database) -> Result<i64, UserError> {
        match db {
            Database::Sqlite(pool) => count_users_sqlite(pool).await,
            Database::Postgres(pool) => count_users_postgres(pool).await,
        }
    }

    pub(crate) async fn upsert_with_id(
        db: &Database,
        id: i64,
        user: &NewUser,
    ) -> Result<(), UserError> {
        match db {
            Database::Sqlite(pool) => upsert_user_with_id_sqlite(pool, id, user).await,
            Database::Postgres(pool) => upsert_user_with_id_postgres(pool, id, user).await,
        }
    }

    /// Keep generated ids ahead of explicitly inserted ones
    ///
    /// SQLite's AUTOINCREMENT already tracks the highest id it has seen.
    pub(crate) async fn sync_id_sequence(db: &Database) -> Result<(), UserError> {
        match db {
            Database::Sqlite(_) => Ok(()),
            Database::Postgres(pool) => sync_id_sequence_postgres(pool).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{new_user, test_database};
    use std::time::Duration;

    async fn store() -> (Database, Arc<dyn UserRepository>) {
        let db = test_database().await;
        let repo = UserStore::for_database(&db);
        (db, repo)
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let db = Database::in_memory().await.expect("open");

        UserStore::init(&db, &AppEnv::Test)
            .await
            .expect("first init should succeed");
        UserStore::init(&db, &AppEnv::Test)
            .await
            .expect("second init should succeed");
    }

    #[tokio::test]
    async fn test_init_in_production_does_not_create_tables() {
        let db = Database::in_memory().await.expect("open");

        let err = UserStore::init(&db, &AppEnv::Production)
            .await
            .expect_err("missing table must be reported in production");
        assert!(matches!(err, UserError::Storage(msg) if msg.contains("does not exist")));
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let (_db, repo) = store().await;

        let user = repo
            .insert(new_user("Alice Smith", "alice@example.com", Some(41)))
            .await
            .expect("insert should succeed");

        assert!(user.id > 0);
        assert_eq!(user.name, "Alice Smith");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.age, Some(41));
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn test_insert_without_age() {
        let (_db, repo) = store().await;

        let user = repo
            .insert(new_user("No Age", "noage@example.com", None))
            .await
            .expect("insert should succeed");
        assert_eq!(user.age, None);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let (_db, repo) = store().await;

        repo.insert(new_user("First", "dup@example.com", None))
            .await
            .expect("first insert should succeed");
        let err = repo
            .insert(new_user("Second", "dup@example.com", None))
            .await
            .expect_err("duplicate email must fail");

        assert!(matches!(err, UserError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let (_db, repo) = store().await;
        let created = repo
            .insert(new_user("Find Me", "find@example.com", None))
            .await
            .expect("insert");

        let found = repo.find_by_id(created.id).await.expect("lookup");
        assert_eq!(found, Some(created));

        let missing = repo.find_by_id(999_999).await.expect("lookup");
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_find_all_is_newest_first() {
        let (_db, repo) = store().await;

        for (name, email) in [
            ("One", "one@example.com"),
            ("Two", "two@example.com"),
            ("Three", "three@example.com"),
        ] {
            repo.insert(new_user(name, email, None)).await.expect("insert");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let users = repo.find_all().await.expect("list");
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Three", "Two", "One"]);

        for pair in users.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let (_db, repo) = store().await;
        let created = repo
            .insert(new_user("Keep Me", "keep@example.com", Some(20)))
            .await
            .expect("insert");

        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = repo
            .update(
                created.id,
                UserChanges {
                    age: Some(21),
                    ..Default::default()
                },
            )
            .await
            .expect("update");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.age, Some(21));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let (_db, repo) = store().await;

        let err = repo
            .update(
                424_242,
                UserChanges {
                    name: Some("Ghost".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect_err("update of missing user must fail");
        assert_eq!(err, UserError::NotFound);
    }

    #[tokio::test]
    async fn test_update_to_taken_email() {
        let (_db, repo) = store().await;
        repo.insert(new_user("A", "a@example.com", None))
            .await
            .expect("insert a");
        let b = repo
            .insert(new_user("B", "b@example.com", None))
            .await
            .expect("insert b");

        let err = repo
            .update(
                b.id,
                UserChanges {
                    email: Some("a@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect_err("taken email must fail");
        assert!(matches!(err, UserError::UniqueViolation(_)));

        let unchanged = repo.find_by_id(b.id).await.expect("lookup").expect("exists");
        assert_eq!(unchanged.email, "b@example.com");
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_ids_are_not_reused() {
        let (_db, repo) = store().await;
        let created = repo
            .insert(new_user("Short Lived", "short@example.com", None))
            .await
            .expect("insert");

        repo.delete(created.id).await.expect("delete");
        assert_eq!(repo.find_by_id(created.id).await.expect("lookup"), None);
        assert_eq!(
            repo.delete(created.id).await.expect_err("second delete"),
            UserError::NotFound
        );

        let next = repo
            .insert(new_user("Next", "next@example.com", None))
            .await
            .expect("insert");
        assert!(next.id > created.id);
    }

    #[tokio::test]
    async fn test_count() {
        let (db, repo) = store().await;
        assert_eq!(UserStore::count(&db).await.expect("count"), 0);

        repo.insert(new_user("Counted", "counted@example.com", None))
            .await
            .expect("insert");
        assert_eq!(UserStore::count(&db).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn test_upsert_with_id_overwrites() {
        let (db, repo) = store().await;

        UserStore::upsert_with_id(&db, 5, &new_user("Old", "old@example.com", None))
            .await
            .expect("first upsert");
        UserStore::upsert_with_id(&db, 5, &new_user("New", "new@example.com", Some(9)))
            .await
            .expect("second upsert");

        let user = repo.find_by_id(5).await.expect("lookup").expect("exists");
        assert_eq!(user.name, "New");
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.age, Some(9));

        let generated = repo
            .insert(new_user("After", "after@example.com", None))
            .await
            .expect("insert");
        assert!(generated.id > 5);
    }
}
