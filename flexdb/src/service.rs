//! User service: repository outcomes mapped onto a small set of failure kinds
//!
//! Callers only ever see [`ServiceError`]; storage details are logged here and
//! dropped.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::userdb::{NewUser, User, UserChanges, UserError, UserRepository};

/// Why a service call did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceError {
    #[error("User not found")]
    NotFound,

    #[error("Email already exists")]
    EmailExists,

    #[error("Database error")]
    DatabaseError,
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::EmailExists => "email_exists",
            Self::DatabaseError => "database_error",
        }
    }
}

impl From<UserError> for ServiceError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => Self::NotFound,
            UserError::UniqueViolation(_) => Self::EmailExists,
            UserError::Storage(msg) => {
                tracing::error!(error = %msg, "User storage failure");
                Self::DatabaseError
            }
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// All users, newest first
    pub async fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn get_user(&self, id: i64) -> ServiceResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn create_user(&self, user: NewUser) -> ServiceResult<User> {
        Ok(self.repository.insert(user).await?)
    }

    pub async fn update_user(&self, id: i64, changes: UserChanges) -> ServiceResult<User> {
        Ok(self.repository.update(id, changes).await?)
    }

    pub async fn delete_user(&self, id: i64) -> ServiceResult<()> {
        Ok(self.repository.delete(id).await?)
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}
