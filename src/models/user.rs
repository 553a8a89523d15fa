use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored credential record.
///
/// `password_hash` is a bcrypt string that embeds its own salt and cost, so
/// the record carries everything verification needs. It is skipped during
/// serialization: a `User` can be rendered into a response body without ever
/// exposing hash material.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds a new record for `username` around an already-computed hash.
    /// Plaintext passwords never pass through here.
    pub fn new(username: &str, password_hash: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        }
    }
}
