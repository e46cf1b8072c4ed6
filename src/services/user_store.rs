//! Credential store: account rows backed by SQLite.

use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::user::User;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid username or password")]
    InvalidUsernameOrPassword,
    #[error("username `{0}` is already taken")]
    DuplicateUsername(String),
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

pub type CredentialResult<T> = Result<T, CredentialError>;

/// Persists user identity and password hash; no logic beyond storage.
#[derive(Clone)]
pub struct UserStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl UserStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert a new account.
    ///
    /// Uniqueness is enforced by the store's constraint; a violation
    /// surfaces as `DuplicateUsername` rather than an opaque store error.
    pub async fn create(&self, username: &str, password_hash: &str) -> CredentialResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };

        match sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.db)
        .await
        {
            Ok(_) => Ok(user),
            Err(err) if is_unique_violation(&err) => {
                Err(CredentialError::DuplicateUsername(username.to_string()))
            }
            Err(err) => Err(CredentialError::Store(err)),
        }
    }

    /// Look up an account by its unique username.
    pub async fn find_by_username(&self, username: &str) -> CredentialResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at, updated_at
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&*self.db)
        .await?;

        Ok(user)
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_pool;

    #[tokio::test]
    async fn create_and_find_round_trip() {
        let store = UserStore::new(memory_pool().await);

        let created = store.create("alice", "hash-a").await.unwrap();
        let found = store.find_by_username("alice").await.unwrap().unwrap();

        assert_eq!(found.id, created.id);
        assert_eq!(found.password_hash, "hash-a");
    }

    #[tokio::test]
    async fn unknown_username_is_none() {
        let store = UserStore::new(memory_pool().await);
        assert!(store.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_reported_explicitly() {
        let store = UserStore::new(memory_pool().await);
        store.create("alice", "hash-a").await.unwrap();

        let err = store.create("alice", "hash-b").await.unwrap_err();
        assert!(matches!(err, CredentialError::DuplicateUsername(name) if name == "alice"));
    }
}
