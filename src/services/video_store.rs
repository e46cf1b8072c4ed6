//! Video metadata store backed by SQLite.

use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::video::Video;

/// Persists and queries video metadata records.
#[derive(Clone)]
pub struct VideoStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl VideoStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert one fully-formed record as a single statement.
    pub async fn insert(&self, video: &Video) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO videos (id, title, description, url, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.url)
        .bind(video.user_id)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(&*self.db)
        .await?;

        Ok(())
    }

    /// All videos owned by `user_id`, in store-native order.
    pub async fn list_owned(&self, user_id: Uuid) -> Result<Vec<Video>, sqlx::Error> {
        sqlx::query_as::<_, Video>(
            "SELECT id, title, description, url, user_id, created_at, updated_at
             FROM videos WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&*self.db)
        .await
    }

    /// Number of stored records across all users.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM videos")
            .fetch_one(&*self.db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_pool, sample_video};

    #[tokio::test]
    async fn list_owned_filters_by_owner() {
        let pool = memory_pool().await;
        let store = VideoStore::new(pool);

        let owner_a = Uuid::new_v4();
        let owner_b = Uuid::new_v4();
        store.insert(&sample_video(owner_a, "a1")).await.unwrap();
        store.insert(&sample_video(owner_a, "a2")).await.unwrap();
        store.insert(&sample_video(owner_b, "b1")).await.unwrap();

        let owned = store.list_owned(owner_a).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|video| video.user_id == owner_a));

        let owned = store.list_owned(owner_b).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].title, "b1");
    }

    #[tokio::test]
    async fn list_owned_is_empty_for_user_without_videos() {
        let store = VideoStore::new(memory_pool().await);
        let owned = store.list_owned(Uuid::new_v4()).await.unwrap();
        assert!(owned.is_empty());
    }
}
