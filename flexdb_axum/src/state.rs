use flexdb::{AppEnv, Database, UserService, UserStore};

/// Shared handles for every request
#[derive(Clone, Debug)]
pub struct AppState {
    pub users: UserService,
    pub database: Database,
    pub environment: AppEnv,
}

impl AppState {
    pub fn new(database: Database, environment: AppEnv) -> Self {
        Self {
            users: UserService::new(UserStore::for_database(&database)),
            database,
            environment,
        }
    }

    /// State around a caller-supplied service, e.g. one backed by a custom repository
    pub fn with_service(users: UserService, database: Database, environment: AppEnv) -> Self {
        Self {
            users,
            database,
            environment,
        }
    }
}
