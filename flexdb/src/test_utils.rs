//! Shared helpers for unit tests

use crate::config::AppEnv;
use crate::storage::Database;
use crate::userdb::{NewUser, UserStore};

/// Fresh in-memory database with the users table in place
pub(crate) async fn test_database() -> Database {
    let db = Database::in_memory()
        .await
        .expect("in-memory database should open");
    UserStore::init(&db, &AppEnv::Test)
        .await
        .expect("users table should initialize");
    db
}

pub(crate) fn new_user(name: &str, email: &str, age: Option<i32>) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        age,
    }
}
