mod errors;
mod fixtures;
mod storage;
mod types;

pub use errors::UserError;
pub use fixtures::{FIXTURE_USERS, FixtureUser, load_fixtures};
pub use storage::{PostgresUserStore, SqliteUserStore, UserRepository, UserStore};
pub use types::{NewUser, User, UserChanges};
