//! Represents a registered account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user of the service.
///
/// The username is unique and immutable after creation. The password hash is
/// opaque to the rest of the system and never leaves the process: it is
/// skipped during serialization so no response can carry it.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct User {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Unique login name.
    pub username: String,

    /// Salted one-way hash of the password. Never serialized outward.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last modified.
    pub updated_at: DateTime<Utc>,
}
