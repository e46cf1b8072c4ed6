//! Represents an uploaded, transcoded video.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata record for one playable video.
///
/// A row is inserted exactly once per successful ingestion, strictly after
/// every HLS segment has been uploaded to object storage. The `url` field is
/// the public locator of the HLS manifest; playback clients fetch segments
/// relative to it, so a visible record always points at a complete asset.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Video {
    /// Internal UUID, also the key prefix of the stored segments.
    pub id: Uuid,

    /// Display title (the original upload file name).
    pub title: String,

    /// Free-form description.
    pub description: String,

    /// Public URL of the HLS manifest (`.../{id}/index.m3u8`).
    pub url: String,

    /// Owning user.
    pub user_id: Uuid,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}
