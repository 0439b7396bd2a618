use thiserror::Error;

#[derive(Clone, Error, Debug, PartialEq)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    /// A value that must be unique (email) is already taken
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                UserError::UniqueViolation(db_err.message().to_string())
            }
            sqlx::Error::RowNotFound => UserError::NotFound,
            _ => UserError::Storage(err.to_string()),
        }
    }
}
