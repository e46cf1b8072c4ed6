//! Upload and listing handlers.
//!
//! The upload handler streams the multipart `video` field straight into the
//! ingestion pipeline; the file never sits fully in memory.

use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use futures::StreamExt;
use serde_json::json;
use std::io;

use crate::auth::extract::AuthenticatedUser;
use crate::errors::AppError;
use crate::models::video::Video;
use crate::state::AppState;

/// `POST /upload` — ingest the multipart field `video` for the
/// authenticated user.
pub async fn upload(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut uploaded: Option<Video> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("invalid multipart body: {}", err)))?
    {
        if field.name() != Some("video") {
            continue;
        }

        let upload_name = field.file_name().unwrap_or("upload.mp4").to_string();
        let stream =
            field.map(|chunk| chunk.map_err(|err| io::Error::new(io::ErrorKind::Other, err)));

        let video = state
            .pipeline
            .ingest(&user, &upload_name, stream)
            .await
            .inspect_err(|err| {
                tracing::error!(error = ?err, user = %user.username, "ingest failed");
            })?;

        uploaded = Some(video);
        break;
    }

    let video = uploaded
        .ok_or_else(|| AppError::bad_request("video file not found in form data"))?;

    Ok(Json(json!({
        "status": "video uploaded and saved successfully",
        "video_url": video.url,
    })))
}

/// `GET /videos` — list the authenticated user's videos.
pub async fn list_videos(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let videos = state.videos.list_owned(user.id).await.map_err(|err| {
        tracing::error!(error = %err, user = %user.username, "video listing failed");
        AppError::internal("error listing videos")
    })?;

    Ok(Json(json!({ "videos": videos })))
}
