use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::storage::validate_sqlite_table_schema;
use crate::userdb::{
    errors::UserError,
    types::{NewUser, User, UserChanges},
};

use super::config::{DB_TABLE_USERS, SQLITE_USER_COLUMNS};

// SQLite implementations
pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS;

    // Create users table; AUTOINCREMENT keeps ids from being reused after deletes
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            age INTEGER,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

/// Validates that the users table schema matches what we expect
pub(super) async fn validate_user_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    validate_sqlite_table_schema(
        pool,
        DB_TABLE_USERS,
        SQLITE_USER_COLUMNS,
        UserError::Storage,
    )
    .await
}

pub(super) async fn get_all_users_sqlite(pool: &Pool<Sqlite>) -> Result<Vec<User>, UserError> {
    let table_name = DB_TABLE_USERS;

    // Newest first; id breaks ties within the same timestamp
    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} ORDER BY created_at DESC, id DESC
        "#
    ))
    .fetch_all(pool)
    .await
    .map_err(UserError::from)
}

pub(super) async fn get_user_sqlite(pool: &Pool<Sqlite>, id: i64) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS;

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(UserError::from)
}

pub(super) async fn insert_user_sqlite(
    pool: &Pool<Sqlite>,
    user: NewUser,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS;
    let now = Utc::now();

    // Insert and read back the generated id in one query
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (name, email, age, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#
    ))
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.age)
    .bind(now) // created_at
    .bind(now) // updated_at
    .fetch_one(pool)
    .await
    .map_err(UserError::from)
}

pub(super) async fn update_user_sqlite(
    pool: &Pool<Sqlite>,
    id: i64,
    changes: UserChanges,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS;
    let now = Utc::now();

    // Only overwrite the columns that were provided; NULL binds keep the stored value
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE {table_name} SET
            name = COALESCE(?, name),
            email = COALESCE(?, email),
            age = COALESCE(?, age),
            updated_at = ?
        WHERE id = ?
        RETURNING *
        "#
    ))
    .bind(changes.name)
    .bind(changes.email)
    .bind(changes.age)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(UserError::NotFound)
}

pub(super) async fn delete_user_sqlite(pool: &Pool<Sqlite>, id: i64) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS;

    // Delete the user; zero affected rows means no such id
    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(UserError::NotFound);
    }

    Ok(())
}

pub(super) async fn count_users_sqlite(pool: &Pool<Sqlite>) -> Result<i64, UserError> {
    let table_name = DB_TABLE_USERS;

    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table_name}"))
        .fetch_one(pool)
        .await
        .map_err(UserError::from)
}

/// Insert or overwrite the row with the given id
pub(super) async fn upsert_user_with_id_sqlite(
    pool: &Pool<Sqlite>,
    id: i64,
    user: &NewUser,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS;
    let now = Utc::now();

    // Upsert user with a single query
    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (id, name, email, age, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            name = excluded.name,
            email = excluded.email,
            age = excluded.age,
            updated_at = excluded.updated_at
        "#
    ))
    .bind(id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.age)
    .bind(now) // created_at
    .bind(now) // updated_at
    .execute(pool)
    .await?;

    Ok(())
}
