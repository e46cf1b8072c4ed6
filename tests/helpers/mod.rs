//! Test application setup: the real router and stores over an in-memory
//! database, with the transcoder and object-storage gateway replaced by
//! controllable doubles.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use video_streaming::auth::token::TokenService;
use video_streaming::db;
use video_streaming::routes::routes::routes;
use video_streaming::services::pipeline::IngestPipeline;
use video_streaming::services::transcoder::{TranscodeError, Transcoder};
use video_streaming::services::user_store::UserStore;
use video_streaming::services::video_store::VideoStore;
use video_streaming::state::AppState;
use video_streaming::storage::{GatewayError, GatewayResult, ObjectStorageGateway};

/// Signing secret shared by every test app, so tests can mint their own
/// tokens when they need a tampered or expired one.
pub const TEST_TOKEN_SECRET: &str = "integration-test-secret";

/// Transcoder double producing a fixed one-manifest-two-segments layout.
pub struct FakeTranscoder;

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(
        &self,
        _input: &Path,
        output_dir: &Path,
        _segment_seconds: u32,
    ) -> Result<(), TranscodeError> {
        for (name, data) in [
            ("index.m3u8", b"#EXTM3U".as_slice()),
            ("seg0.ts", b"segment zero".as_slice()),
            ("seg1.ts", b"segment one".as_slice()),
        ] {
            tokio::fs::write(output_dir.join(name), data).await?;
        }
        Ok(())
    }
}

/// Transcoder double that reports a non-zero exit status.
pub struct BrokenTranscoder;

#[async_trait]
impl Transcoder for BrokenTranscoder {
    async fn transcode(
        &self,
        _input: &Path,
        _output_dir: &Path,
        _segment_seconds: u32,
    ) -> Result<(), TranscodeError> {
        Err(TranscodeError::Failed {
            code: Some(1),
            stderr: "simulated ffmpeg failure".into(),
        })
    }
}

/// Gateway double recording every put, optionally failing the Nth one.
pub struct RecordingGateway {
    objects: Mutex<Vec<(String, Vec<u8>)>>,
    fail_on: Option<usize>,
}

impl RecordingGateway {
    pub fn new(fail_on: Option<usize>) -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
            fail_on,
        }
    }

    pub fn stored_keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStorageGateway for RecordingGateway {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> GatewayResult<String> {
        let mut objects = self.objects.lock().unwrap();
        if self.fail_on == Some(objects.len()) {
            return Err(GatewayError::PutFailed {
                key: key.to_string(),
                message: "simulated failure".into(),
            });
        }
        objects.push((key.to_string(), data));
        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://clips.s3.eu-west-1.amazonaws.com/{}", key)
    }
}

/// Fully wired test application.
pub struct TestApp {
    pub server: TestServer,
    pub gateway: Arc<RecordingGateway>,
    pub videos: VideoStore,
    pub tokens: TokenService,
    _staging: TempDir,
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(Arc::new(FakeTranscoder), Arc::new(RecordingGateway::new(None))).await
}

pub async fn setup_test_app_with(
    transcoder: Arc<dyn Transcoder>,
    gateway: Arc<RecordingGateway>,
) -> TestApp {
    let pool = Arc::new(
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool"),
    );
    db::run_migrations(&pool).await.expect("migrations");

    let staging = TempDir::new().expect("staging dir");
    let users = UserStore::new(pool.clone());
    let videos = VideoStore::new(pool.clone());
    let tokens = TokenService::new(TEST_TOKEN_SECRET, 3600);
    let pipeline = Arc::new(IngestPipeline::new(
        videos.clone(),
        gateway.clone(),
        transcoder,
        staging.path(),
        10,
    ));

    let state = AppState {
        users,
        videos: videos.clone(),
        tokens: tokens.clone(),
        pipeline,
        staging_dir: staging.path().to_path_buf(),
    };

    let server = TestServer::new(routes().with_state(state)).expect("test server");

    TestApp {
        server,
        gateway,
        videos,
        tokens,
        _staging: staging,
    }
}

/// Register an account and return a bearer token for it.
pub async fn register_and_login(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post("/register")
        .json(&json!({ "username": username, "password": password }))
        .await;
    assert_eq!(response.status_code(), 201, "register failed: {}", response.text());

    let response = server
        .post("/login")
        .json(&json!({ "username": username, "password": password }))
        .await;
    assert_eq!(response.status_code(), 200, "login failed: {}", response.text());

    response.json::<serde_json::Value>()["token"]
        .as_str()
        .expect("token in login response")
        .to_string()
}
