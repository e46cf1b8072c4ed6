//! Shared fixtures for unit tests.

use chrono::Utc;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{user::User, video::Video};

/// Fresh in-memory SQLite pool with the schema applied. A single connection
/// keeps every query in the same database.
pub async fn memory_pool() -> Arc<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");

    crate::db::run_migrations(&pool).await.expect("migrations");
    Arc::new(pool)
}

pub fn sample_user(username: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        password_hash: "irrelevant".to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_video(owner: Uuid, title: &str) -> Video {
    let now = Utc::now();
    let id = Uuid::new_v4();
    Video {
        id,
        title: title.to_string(),
        description: String::new(),
        url: format!("https://clips.s3.eu-west-1.amazonaws.com/{}/index.m3u8", id),
        user_id: owner,
        created_at: now,
        updated_at: now,
    }
}
