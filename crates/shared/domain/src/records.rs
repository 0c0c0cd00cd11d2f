//! Records kept in the document store.

use crate::constants::{TODOS_COLLECTION, USERS_COLLECTION};
use serde::{Deserialize, Serialize};

/// A record addressable by a string id inside a named collection.
pub trait Document {
    /// Collection name; also the snapshot file stem.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Optional public profile attached to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    /// Avatar URL.
    pub pfp: String,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    /// Argon2 PHC string; `None` for accounts created through GitHub.
    pub password_hash: Option<String>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    /// The only refresh token currently honoured for this user.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub github_login: Option<String>,
}

/// A todo item, always owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub task_complete: bool,
}

impl Document for UserRecord {
    const COLLECTION: &'static str = USERS_COLLECTION;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for TodoRecord {
    const COLLECTION: &'static str = TODOS_COLLECTION;

    fn id(&self) -> &str {
        &self.id
    }
}
