use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::storage::validate_postgres_table_schema;
use crate::userdb::{
    errors::UserError,
    types::{NewUser, User, UserChanges},
};

use super::config::{DB_TABLE_USERS, POSTGRES_USER_COLUMNS};

// PostgreSQL implementations
pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS;

    // Create users table
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            email VARCHAR(255) NOT NULL UNIQUE,
            age INTEGER,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

/// Validates that the users table schema matches what we expect
pub(super) async fn validate_user_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    validate_postgres_table_schema(
        pool,
        DB_TABLE_USERS,
        POSTGRES_USER_COLUMNS,
        UserError::Storage,
    )
    .await
}

pub(super) async fn get_all_users_postgres(pool: &Pool<Postgres>) -> Result<Vec<User>, UserError> {
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

pub(super) async fn get_user_postgres(
    pool: &Pool<Postgres>,
    id: i64,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS;

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(UserError::from)
}

pub(super) async fn insert_user_postgres(
    pool: &Pool<Postgres>,
    user: NewUser,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS;
    let now = Utc::now();

    // Insert and read back the generated id in one query
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (name, email, age, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5)
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

pub(super) async fn update_user_postgres(
    pool: &Pool<Postgres>,
    id: i64,
    changes: UserChanges,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS;
    let now = Utc::now();

    // Only overwrite the columns that were provided
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE {table_name} SET
            name = COALESCE($1, name),
            email = COALESCE($2, email),
            age = COALESCE($3, age),
            updated_at = $4
        WHERE id = $5
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

pub(super) async fn delete_user_postgres(pool: &Pool<Postgres>, id: i64) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS;

    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE id = $1
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

pub(super) async fn count_users_postgres(pool: &Pool<Postgres>) -> Result<i64, UserError> {
    let table_name = DB_TABLE_USERS;

    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table_name}"))
        .fetch_one(pool)
        .await
        .map_err(UserError::from)
}

/// Insert or overwrite the row with the given id
pub(super) async fn upsert_user_with_id_postgres(
    pool: &Pool<Postgres>,
    id: i64,
    user: &NewUser,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS;
    let now = Utc::now();

    // Upsert user with a single query
    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (id, name, email, age, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            email = EXCLUDED.email,
            age = EXCLUDED.age,
            updated_at = EXCLUDED.updated_at
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

/// Move the id sequence past rows inserted with explicit ids
pub(super) async fn sync_id_sequence_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS;

    sqlx::query(&format!(
        r#"
        SELECT setval(
            pg_get_serial_sequence('{table_name}', 'id'),
            GREATEST((SELECT COALESCE(MAX(id), 0) FROM {table_name}), 1)
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}
