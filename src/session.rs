//!
//! # Session store selection
//!
//! The session backend is chosen exactly once, at startup, from the
//! environment mode and the database URL. Production gets a durable
//! Postgres-backed store; everything else, and any production startup where
//! the durable store cannot be reached, gets the in-memory store. Selection
//! never aborts the process: a broken database URL in production logs a
//! warning and falls back, it does not crash the server.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::{Config, Environment};
use crate::error::AppError;

/// Sessions live one hour, matching the access token lifetime.
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(3600);

/// Session configuration fixed at startup: signing secret, record lifetime,
/// and the selected backing store.
pub struct SessionSettings {
    pub secret: String,
    pub max_age: Duration,
    pub store: SessionStore,
}

impl SessionSettings {
    pub async fn from_config(config: &Config) -> SessionSettings {
        SessionSettings {
            secret: config.session_secret.clone(),
            max_age: SESSION_MAX_AGE,
            store: SessionStore::select(config.environment, &config.database_url).await,
        }
    }
}

/// A single session record: opaque JSON state plus an absolute expiry.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SessionRecord {
    pub id: String,
    pub data: serde_json::Value,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(data: serde_json::Value, max_age: Duration) -> SessionRecord {
        let ttl = chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::zero());
        SessionRecord {
            id: Uuid::new_v4().to_string(),
            data,
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

pub enum SessionStore {
    Durable(PgPool),
    InMemory(RwLock<HashMap<String, SessionRecord>>),
}

impl SessionStore {
    pub fn in_memory() -> SessionStore {
        SessionStore::InMemory(RwLock::new(HashMap::new()))
    }

    /// Picks the backend for this process.
    ///
    /// Outside production the in-memory store is always used and the URL is
    /// never dialed. In production the durable store is attempted, and any
    /// failure (unreachable host, bad URL, schema error) downgrades to
    /// in-memory with a warning.
    pub async fn select(environment: Environment, database_url: &str) -> SessionStore {
        if !environment.is_production() {
            log::info!(
                "session store: in-memory ({} mode)",
                environment.as_str()
            );
            return SessionStore::in_memory();
        }

        match SessionStore::connect_durable(database_url).await {
            Ok(pool) => {
                log::info!("session store: postgres");
                SessionStore::Durable(pool)
            }
            Err(e) => {
                log::warn!(
                    "durable session store unavailable, falling back to in-memory: {}",
                    e
                );
                SessionStore::in_memory()
            }
        }
    }

    async fn connect_durable(database_url: &str) -> Result<PgPool, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                data JSONB NOT NULL,
                expires_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        Ok(pool)
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, SessionStore::Durable(_))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            SessionStore::Durable(_) => "postgres",
            SessionStore::InMemory(_) => "in-memory",
        }
    }

    /// Saves a record, replacing any existing record with the same id.
    pub async fn save(&self, record: &SessionRecord) -> Result<(), AppError> {
        match self {
            SessionStore::Durable(pool) => {
                sqlx::query(
                    "INSERT INTO sessions (id, data, expires_at)
                     VALUES ($1, $2, $3)
                     ON CONFLICT (id) DO UPDATE
                     SET data = EXCLUDED.data, expires_at = EXCLUDED.expires_at",
                )
                .bind(&record.id)
                .bind(&record.data)
                .bind(record.expires_at)
                .execute(pool)
                .await?;
                Ok(())
            }
            SessionStore::InMemory(sessions) => {
                let mut sessions = sessions
                    .write()
                    .map_err(|_| AppError::Internal("session store lock poisoned".into()))?;
                sessions.insert(record.id.clone(), record.clone());
                Ok(())
            }
        }
    }

    /// Loads a live record by id. Expired records are treated as absent; the
    /// in-memory store drops them on the way out.
    pub async fn load(&self, id: &str) -> Result<Option<SessionRecord>, AppError> {
        match self {
            SessionStore::Durable(pool) => {
                let record = sqlx::query_as::<_, SessionRecord>(
                    "SELECT id, data, expires_at FROM sessions
                     WHERE id = $1 AND expires_at > NOW()",
                )
                .bind(id)
                .fetch_optional(pool)
                .await?;
                Ok(record)
            }
            SessionStore::InMemory(sessions) => {
                let mut sessions = sessions
                    .write()
                    .map_err(|_| AppError::Internal("session store lock poisoned".into()))?;
                match sessions.get(id) {
                    Some(record) if record.is_expired() => {
                        sessions.remove(id);
                        Ok(None)
                    }
                    Some(record) => Ok(Some(record.clone())),
                    None => Ok(None),
                }
            }
        }
    }

    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        match self {
            SessionStore::Durable(pool) => {
                sqlx::query("DELETE FROM sessions WHERE id = $1")
                    .bind(id)
                    .execute(pool)
                    .await?;
                Ok(())
            }
            SessionStore::InMemory(sessions) => {
                let mut sessions = sessions
                    .write()
                    .map_err(|_| AppError::Internal("session store lock poisoned".into()))?;
                sessions.remove(id);
                Ok(())
            }
        }
    }
}
