//! Defines routes for the video-hosting API.
//!
//! ## Structure
//! - **Account endpoints**
//!   - `POST /register` — create an account
//!   - `POST /login` — exchange credentials for a bearer token
//!
//! - **Video endpoints** (bearer token required)
//!   - `POST /upload` — multipart upload, field `video`
//!   - `GET  /videos` — list the caller's videos
//!
//! Health endpoints (`/healthz`, `/readyz`) are mounted at the root.

use crate::{
    handlers::{
        auth_handlers::{login, register},
        health_handlers::{healthz, readyz},
        video_handlers::{list_videos, upload},
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Uploads are streamed to disk, but the multipart reader still enforces a
/// ceiling on the request body.
const MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

/// Build and return the router for all API routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // account endpoints
        .route("/register", post(register))
        .route("/login", post(login))
        // video endpoints
        .route("/upload", post(upload))
        .route("/videos", get(list_videos))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
