mod config;
mod types;

pub use types::Database;
