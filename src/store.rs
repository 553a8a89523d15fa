//!
//! # Credential store
//!
//! `UserStore` persists credential records keyed by username. The Postgres
//! variant is what production runs on; the in-memory variant backs tests and
//! local development without a database. Username uniqueness is enforced by
//! the store itself in both variants, not by a lookup before insert: under
//! Postgres the `UNIQUE` constraint decides, in memory the check and insert
//! happen under one exclusive lock.

use std::collections::HashMap;
use std::sync::RwLock;

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::User;

pub enum UserStore {
    Postgres(PgPool),
    InMemory(RwLock<HashMap<String, User>>),
}

impl UserStore {
    pub fn postgres(pool: PgPool) -> UserStore {
        UserStore::Postgres(pool)
    }

    pub fn in_memory() -> UserStore {
        UserStore::InMemory(RwLock::new(HashMap::new()))
    }

    /// Creates the `users` table if it does not exist yet. Run once at
    /// startup before the store takes traffic.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Inserts a new credential record.
    ///
    /// Returns `AppError::DuplicateUsername` when the username is already
    /// taken. Two concurrent inserts of the same username cannot both
    /// succeed; whichever loses gets the duplicate error.
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        match self {
            UserStore::Postgres(pool) => {
                let user = User::new(username, password_hash);
                sqlx::query_as::<_, User>(
                    "INSERT INTO users (id, username, password_hash, created_at)
                     VALUES ($1, $2, $3, $4)
                     RETURNING id, username, password_hash, created_at",
                )
                .bind(user.id)
                .bind(&user.username)
                .bind(&user.password_hash)
                .bind(user.created_at)
                .fetch_one(pool)
                .await
                .map_err(|e| match &e {
                    sqlx::Error::Database(db) if db.is_unique_violation() => {
                        AppError::DuplicateUsername
                    }
                    _ => AppError::from(e),
                })
            }
            UserStore::InMemory(users) => {
                let mut users = users
                    .write()
                    .map_err(|_| AppError::Internal("user store lock poisoned".into()))?;
                if users.contains_key(username) {
                    return Err(AppError::DuplicateUsername);
                }
                let user = User::new(username, password_hash);
                users.insert(username.to_string(), user.clone());
                Ok(user)
            }
        }
    }

    /// Looks up a credential record by exact username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        match self {
            UserStore::Postgres(pool) => {
                let user = sqlx::query_as::<_, User>(
                    "SELECT id, username, password_hash, created_at
                     FROM users WHERE username = $1",
                )
                .bind(username)
                .fetch_optional(pool)
                .await?;
                Ok(user)
            }
            UserStore::InMemory(users) => {
                let users = users
                    .read()
                    .map_err(|_| AppError::Internal("user store lock poisoned".into()))?;
                Ok(users.get(username).cloned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uuid::Uuid;

    #[actix_rt::test]
    async fn test_memory_create_and_find() {
        let store = UserStore::in_memory();

        let created = store.create("alice", "$2b$04$somehash").await.unwrap();
        assert_eq!(created.username, "alice");

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.password_hash, "$2b$04$somehash");

        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_memory_lookup_is_exact_match() {
        let store = UserStore::in_memory();
        store.create("alice", "$2b$04$somehash").await.unwrap();

        assert!(store.find_by_username("Alice").await.unwrap().is_none());
        assert!(store.find_by_username("alice ").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_memory_duplicate_username_is_rejected() {
        let store = UserStore::in_memory();
        let first = store.create("alice", "$2b$04$firsthash").await.unwrap();

        let second = store.create("alice", "$2b$04$other").await;
        assert!(matches!(second, Err(AppError::DuplicateUsername)));

        // The losing insert must not have touched the stored record.
        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.password_hash, "$2b$04$firsthash");
    }

    #[actix_rt::test]
    async fn test_memory_concurrent_creates_admit_exactly_one() {
        let store = Arc::new(UserStore::in_memory());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(actix_rt::spawn(async move {
                store.create("alice", "$2b$04$somehash").await.is_ok()
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }

    #[actix_rt::test]
    #[ignore] // needs a running Postgres; set DATABASE_URL and pass --ignored
    async fn test_postgres_create_find_and_duplicate() {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&database_url).await.unwrap();
        UserStore::ensure_schema(&pool).await.unwrap();
        let store = UserStore::postgres(pool);

        let username = format!("user_{}", Uuid::new_v4().simple());
        let created = store.create(&username, "$2b$04$somehash").await.unwrap();

        let found = store.find_by_username(&username).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        let duplicate = store.create(&username, "$2b$04$other").await;
        assert!(matches!(duplicate, Err(AppError::DuplicateUsername)));
    }
}
