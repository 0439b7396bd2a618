//! Central configuration for the flexdb crate
//!
//! The database target is derived from environment variables only. Resolution is
//! a pure function over a lookup closure so callers (and tests) can feed it any
//! source; [`DatabaseConfig::from_env`] binds it to the process environment.

use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Connection URL used when `DATABASE_TYPE=postgres` is set without `DATABASE_URL`
pub const DEFAULT_SERVER_URL: &str = "postgres://localhost:5432/myapp_dev";

/// On-disk location of the development database
pub const DEFAULT_FILE_PATH: &str = "./data/dev.db";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Deployment environment, read from `NODE_ENV`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEnv {
    Test,
    Development,
    Production,
    Other(String),
}

impl AppEnv {
    /// An unset `NODE_ENV` means development.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup("NODE_ENV").as_deref() {
            None | Some("development") => Self::Development,
            Some("test") => Self::Test,
            Some("production") => Self::Production,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Test => "test",
            Self::Development => "development",
            Self::Production => "production",
            Self::Other(name) => name,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which database the process talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// Embedded database that lives only as long as the process
    Memory { load_fixtures: bool },
    /// Embedded database persisted at `path`; seeded when empty
    File { path: PathBuf },
    /// External database server
    Server { url: String, load_fixtures: bool },
}

impl DatabaseConfig {
    /// Derive the database target from environment variables
    ///
    /// Rules, first match wins:
    /// 1. `NODE_ENV=test` selects an in-memory database with fixtures
    /// 2. `DATABASE_TYPE=postgres` selects the server, `DATABASE_URL` falling back to
    ///    [`DEFAULT_SERVER_URL`]; fixtures only with `FORCE_FIXTURES=true`
    /// 3. development (the default) selects the file database at `DATABASE_PATH`
    ///    or [`DEFAULT_FILE_PATH`]
    /// 4. anything else requires `DATABASE_URL`
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = AppEnv::resolve(&lookup);

        if env == AppEnv::Test {
            return Ok(Self::Memory {
                load_fixtures: true,
            });
        }

        if lookup("DATABASE_TYPE").as_deref() == Some("postgres") {
            return Ok(Self::Server {
                url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
                load_fixtures: lookup("FORCE_FIXTURES").as_deref() == Some("true"),
            });
        }

        if env == AppEnv::Development {
            let path = lookup("DATABASE_PATH").unwrap_or_else(|| DEFAULT_FILE_PATH.to_string());
            return Ok(Self::File {
                path: PathBuf::from(path),
            });
        }

        let url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingVar("DATABASE_URL"))?;

        Ok(Self::Server {
            url,
            load_fixtures: false,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory { .. } => "memory",
            Self::File { .. } => "file",
            Self::Server { .. } => "server",
        }
    }
}
