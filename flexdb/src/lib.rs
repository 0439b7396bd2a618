//! flexdb - user records over a selectable SQL backend
//!
//! The database target (in-memory SQLite, SQLite file, or PostgreSQL server)
//! is resolved from the environment, opened once at startup, and handed to a
//! [`UserService`] that reports failures as a small set of [`ServiceError`]
//! kinds.

mod bootstrap;
mod config;
mod service;
mod storage;
mod userdb;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use bootstrap::{InitError, init};

pub use config::{AppEnv, ConfigError, DEFAULT_FILE_PATH, DEFAULT_SERVER_URL, DatabaseConfig};

pub use service::{ServiceError, ServiceResult, UserService};

pub use storage::{Database, StorageError};

pub use userdb::{
    FIXTURE_USERS, FixtureUser, NewUser, PostgresUserStore, SqliteUserStore, User, UserChanges,
    UserError, UserRepository, UserStore, load_fixtures,
};

pub use validation::{UserPayload, ValidationErrors, validate_create, validate_update};
