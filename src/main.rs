use anyhow::Result;
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use video_streaming::{
    auth::token::TokenService,
    config::AppConfig,
    db,
    routes,
    services::{
        pipeline::IngestPipeline, transcoder::FfmpegTranscoder, user_store::UserStore,
        video_store::VideoStore,
    },
    state::AppState,
    storage::s3::S3Gateway,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Load .env file + parse config + migrate flag ---
    dotenvy::dotenv().ok();
    let (cfg, migrate_only) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting video-streaming with config: {:?}", cfg);

    // --- Ensure staging directory exists ---
    if !Path::new(&cfg.staging_dir).exists() {
        fs::create_dir_all(&cfg.staging_dir)?;
        tracing::info!("Created staging directory at {}", cfg.staging_dir);
    }

    // --- Initialize SQLite connection ---
    let db_url = &cfg.database_url;
    tracing::debug!("Connecting using raw URL => {}", db_url);

    // Extract the local file path SQLx will use
    let db_path = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("file:");

    // Create parent directory if needed; SQLx will not create the database
    // file on its own either.
    let db_path_obj = Path::new(db_path);
    if let Some(parent) = db_path_obj.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }
    if !db_path_obj.exists() {
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(db_path)?;
        tracing::info!("Created empty database file at {}", db_path);
    }

    let db_pool: Arc<sqlx::Pool<sqlx::Sqlite>> = Arc::new(
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?,
    );

    // --- Apply schema (idempotent); --migrate exits afterwards ---
    db::run_migrations(&db_pool).await?;
    if migrate_only {
        tracing::info!("Database migration complete.");
        return Ok(());
    }

    // --- Initialize core services ---
    let users = UserStore::new(db_pool.clone());
    let videos = VideoStore::new(db_pool.clone());
    let tokens = TokenService::new(&cfg.token_secret, cfg.token_ttl_secs);
    let gateway = Arc::new(S3Gateway::new(
        cfg.s3_bucket.clone(),
        cfg.aws_region.clone(),
        cfg.s3_endpoint.clone(),
    )?);
    let transcoder = Arc::new(FfmpegTranscoder::new(cfg.ffmpeg_path.clone())?);
    let pipeline = Arc::new(IngestPipeline::new(
        videos.clone(),
        gateway,
        transcoder,
        &cfg.staging_dir,
        cfg.hls_segment_seconds,
    ));

    let state = AppState {
        users,
        videos,
        tokens,
        pipeline,
        staging_dir: cfg.staging_dir.clone().into(),
    };

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
