//! Shared application state handed to every request handler.

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::token::TokenService;
use crate::services::pipeline::IngestPipeline;
use crate::services::user_store::UserStore;
use crate::services::video_store::VideoStore;

/// Everything a handler needs, constructed once at startup and injected via
/// `Router::with_state`. All members are cheap to clone; no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub videos: VideoStore,
    pub tokens: TokenService,
    pub pipeline: Arc<IngestPipeline>,
    /// Staging root, kept here for the readiness probe.
    pub staging_dir: PathBuf,
}
