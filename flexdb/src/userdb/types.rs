use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored user record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Database-assigned identifier, never reused
    pub id: i64,
    /// Normalized display name
    pub name: String,
    /// Lowercased email address, unique across all users
    pub email: String,
    pub age: Option<i32>,
    /// Set once on insert
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful mutation
    pub updated_at: DateTime<Utc>,
}

/// Fields for a user that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

/// Partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }
}
