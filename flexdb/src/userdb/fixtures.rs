//! Seed users for development and test databases

use crate::config::AppEnv;
use crate::storage::Database;

use super::storage::UserStore;
use super::types::NewUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureUser {
    pub id: i64,
    pub name: &'static str,
    pub email: &'static str,
    pub age: i32,
}

impl FixtureUser {
    fn to_new_user(self) -> NewUser {
        NewUser {
            name: self.name.to_string(),
            email: self.email.to_string(),
            age: Some(self.age),
        }
    }
}

pub const FIXTURE_USERS: [FixtureUser; 3] = [
    FixtureUser {
        id: 1,
        name: "John Doe",
        email: "john@example.com",
        age: 30,
    },
    FixtureUser {
        id: 2,
        name: "Jane Smith",
        email: "jane@example.com",
        age: 25,
    },
    FixtureUser {
        id: 3,
        name: "Bob Johnson",
        email: "bob@example.com",
        age: 35,
    },
];

/// Upsert the fixture users by id and return how many were written
///
/// Refuses to touch a production database. A fixture that cannot be written
/// is logged and skipped; seeding never aborts startup.
pub async fn load_fixtures(db: &Database, env: &AppEnv) -> usize {
    if env.is_production() {
        tracing::warn!("Attempted to load fixtures in production environment");
        return 0;
    }

    tracing::info!("Loading development fixtures");

    let mut loaded = 0;
    for fixture in FIXTURE_USERS {
        match UserStore::upsert_with_id(db, fixture.id, &fixture.to_new_user()).await {
            Ok(()) => loaded += 1,
            Err(e) => {
                tracing::warn!(fixture_id = fixture.id, error = %e, "Could not load fixture");
            }
        }
    }

    if let Err(e) = UserStore::sync_id_sequence(db).await {
        tracing::warn!(error = %e, "Could not advance user id sequence after seeding");
    }

    tracing::info!(count = loaded, "Loaded user fixtures");
    loaded
}
