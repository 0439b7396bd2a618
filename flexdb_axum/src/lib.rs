//! flexdb-axum - HTTP routes for the flexdb user API
//!
//! Build an [`AppState`] from an initialized [`Database`] and mount
//! [`router`]:
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use flexdb_axum::{AppEnv, AppState, DatabaseConfig, init, router};
//!
//! let env = AppEnv::from_env();
//! let db = init(&DatabaseConfig::from_env()?, &env).await?;
//! let app = router(AppState::new(db, env));
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

mod error;
mod health;
mod router;
mod state;
mod users;

#[cfg(test)]
mod test_utils;

pub use error::ApiError;
pub use router::{router, router_no_trace};
pub use state::AppState;

// Re-export what a server needs to open the database
pub use flexdb::{
    AppEnv, ConfigError, Database, DatabaseConfig, InitError, ServiceError, UserService, init,
};
