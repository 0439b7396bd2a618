/// Users table name
pub(crate) const DB_TABLE_USERS: &str = "users";

/// Expected `users` columns on SQLite (name, declared type)
pub(super) const SQLITE_USER_COLUMNS: &[(&str, &str)] = &[
    ("id", "INTEGER"),
    ("name", "TEXT"),
    ("email", "TEXT"),
    ("age", "INTEGER"),
    ("created_at", "TIMESTAMP"),
    ("updated_at", "TIMESTAMP"),
];

/// Expected `users` columns on PostgreSQL (name, information_schema data_type)
pub(super) const POSTGRES_USER_COLUMNS: &[(&str, &str)] = &[
    ("id", "bigint"),
    ("name", "character varying"),
    ("email", "character varying"),
    ("age", "integer"),
    ("created_at", "timestamp with time zone"),
    ("updated_at", "timestamp with time zone"),
];
