//! The ingestion pipeline: upload → staged file → HLS segments → object
//! storage → metadata record.
//!
//! Side effects are strictly ordered and one-directional: filesystem staging,
//! then the external transcoder, then object storage, then the relational
//! store. No step is retried, and a failure in any step is terminal for the
//! request. Segments already uploaded when a later step fails are left in
//! place; the metadata insert happens last, so a visible record always points
//! at a complete asset.

use bytes::Bytes;
use chrono::Utc;
use futures::{Stream, StreamExt, pin_mut};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use thiserror::Error;
use tokio::{fs, fs::File, io::AsyncWriteExt};
use uuid::Uuid;

use crate::models::{user::User, video::Video};
use crate::services::transcoder::{TranscodeError, Transcoder};
use crate::services::video_store::VideoStore;
use crate::storage::ObjectStorageGateway;

/// Well-known manifest file name; part of the locator contract consumers
/// rely on.
pub const MANIFEST_FILE: &str = "index.m3u8";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to stage uploaded file")]
    StagingFailed(#[source] io::Error),
    #[error("failed to transcode video to HLS format")]
    TranscodeFailed(#[source] TranscodeError),
    #[error("failed to list transcoded files")]
    EnumerationFailed(#[source] io::Error),
    #[error("failed to upload file `{filename}` to storage")]
    UploadFailed { filename: String },
    #[error("failed to save video information")]
    MetadataPersistFailed(#[source] sqlx::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Drives one upload from received bytes to a queryable `Video` record.
///
/// All collaborators are injected at construction and shared across
/// requests; per-request state lives entirely in the staging directory each
/// `ingest` call allocates for itself.
pub struct IngestPipeline {
    videos: VideoStore,
    gateway: Arc<dyn ObjectStorageGateway>,
    transcoder: Arc<dyn Transcoder>,
    staging_root: PathBuf,
    segment_seconds: u32,
}

impl IngestPipeline {
    pub fn new(
        videos: VideoStore,
        gateway: Arc<dyn ObjectStorageGateway>,
        transcoder: Arc<dyn Transcoder>,
        staging_root: impl Into<PathBuf>,
        segment_seconds: u32,
    ) -> Self {
        Self {
            videos,
            gateway,
            transcoder,
            staging_root: staging_root.into(),
            segment_seconds,
        }
    }

    /// Ingest one uploaded file for `owner`.
    ///
    /// The caller must already have authenticated the owner. Steps run
    /// strictly sequentially; segment uploads are not fanned out.
    pub async fn ingest<S>(
        &self,
        owner: &User,
        upload_name: &str,
        stream: S,
    ) -> PipelineResult<Video>
    where
        S: Stream<Item = io::Result<Bytes>> + Send,
    {
        // --- Stage input ---
        // Each request gets its own directory under the staging root, so
        // concurrent ingests never alias paths. The directory is removed
        // when `staging` drops, success or not.
        fs::create_dir_all(&self.staging_root)
            .await
            .map_err(PipelineError::StagingFailed)?;
        let staging = TempDir::new_in(&self.staging_root).map_err(PipelineError::StagingFailed)?;

        let input_name = sanitize_file_name(upload_name);
        let input_path = staging.path().join(&input_name);
        let staged_bytes = self
            .stage_stream(&input_path, stream)
            .await
            .map_err(PipelineError::StagingFailed)?;

        tracing::debug!(
            user = %owner.username,
            file = %input_name,
            size_bytes = staged_bytes,
            "upload staged"
        );

        // --- Transcode ---
        let hls_dir = staging.path().join("hls");
        fs::create_dir_all(&hls_dir)
            .await
            .map_err(PipelineError::StagingFailed)?;

        self.transcoder
            .transcode(&input_path, &hls_dir, self.segment_seconds)
            .await
            .map_err(PipelineError::TranscodeFailed)?;

        // --- Enumerate outputs ---
        let segment_names = list_output_files(&hls_dir)
            .await
            .map_err(PipelineError::EnumerationFailed)?;

        // --- Upload segments ---
        let video_id = Uuid::new_v4();
        for name in &segment_names {
            let data = fs::read(hls_dir.join(name)).await.map_err(|err| {
                tracing::error!(error = %err, file = %name, "failed to read transcoded file");
                PipelineError::UploadFailed {
                    filename: name.clone(),
                }
            })?;

            let key = format!("{}/{}", video_id, name);
            self.gateway
                .put_object(&key, data, content_type_for(name))
                .await
                .map_err(|err| {
                    tracing::error!(error = %err, key = %key, "segment upload failed");
                    PipelineError::UploadFailed {
                        filename: name.clone(),
                    }
                })?;
        }

        // --- Persist metadata ---
        // Strictly after every segment landed; uploaded objects are left
        // orphaned if this insert fails.
        let now = Utc::now();
        let video = Video {
            id: video_id,
            title: input_name,
            description: "Default description".to_string(),
            url: self
                .gateway
                .public_url(&format!("{}/{}", video_id, MANIFEST_FILE)),
            user_id: owner.id,
            created_at: now,
            updated_at: now,
        };

        self.videos
            .insert(&video)
            .await
            .map_err(PipelineError::MetadataPersistFailed)?;

        tracing::info!(
            video_id = %video.id,
            user = %owner.username,
            segments = segment_names.len(),
            url = %video.url,
            "video ingested"
        );

        Ok(video)
    }

    /// Copy the uploaded byte stream verbatim into `path`, fsyncing before
    /// returning the byte count.
    async fn stage_stream<S>(&self, path: &Path, stream: S) -> io::Result<u64>
    where
        S: Stream<Item = io::Result<Bytes>> + Send,
    {
        let mut file = File::create(path).await?;
        let mut written: u64 = 0;

        pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        file.sync_all().await?;

        Ok(written)
    }
}

/// List every regular file the transcoder produced, sorted by name for a
/// stable upload order.
async fn list_output_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Strip any directory components from a client-supplied file name.
fn sanitize_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|base| base.to_string_lossy().into_owned())
        .filter(|base| !base.is_empty() && base != "." && base != "..")
        .unwrap_or_else(|| "upload.mp4".to_string())
}

/// MIME type for the HLS artifacts we upload.
fn content_type_for(filename: &str) -> &'static str {
    match Path::new(filename).extension().and_then(|ext| ext.to_str()) {
        Some("m3u8") => "application/vnd.apple.mpegurl",
        Some("ts") => "video/mp2t",
        _ => "application/octet-stream",
    }
}
