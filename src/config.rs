use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt};

/// Centralized application configuration.
/// Combines a `.env` file, environment variables and CLI arguments; read
/// once at startup and immutable afterwards.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Root directory for per-request staging directories.
    pub staging_dir: String,
    /// Target S3 bucket for HLS segments.
    pub s3_bucket: String,
    /// AWS region the bucket lives in.
    pub aws_region: String,
    /// Custom endpoint for S3-compatible providers (MinIO etc.).
    pub s3_endpoint: Option<String>,
    /// HMAC secret for session tokens. Required, never defaulted.
    pub token_secret: String,
    /// Forward validity window of issued tokens, in seconds.
    pub token_ttl_secs: i64,
    /// Path or name of the ffmpeg binary.
    pub ffmpeg_path: String,
    /// Target duration of each HLS segment, in seconds.
    pub hls_segment_seconds: u32,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Video hosting backend with HLS ingestion")]
pub struct Args {
    /// Host to bind to (overrides VIDEO_STREAMING_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides VIDEO_STREAMING_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides VIDEO_STREAMING_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Directory for upload staging areas (overrides VIDEO_STREAMING_STAGING_DIR)
    #[arg(long)]
    pub staging_dir: Option<String>,

    /// S3 bucket for HLS output (overrides VIDEO_STREAMING_S3_BUCKET)
    #[arg(long)]
    pub s3_bucket: Option<String>,

    /// AWS region (overrides VIDEO_STREAMING_AWS_REGION)
    #[arg(long)]
    pub aws_region: Option<String>,

    /// Custom S3 endpoint URL (overrides VIDEO_STREAMING_S3_ENDPOINT)
    #[arg(long)]
    pub s3_endpoint: Option<String>,

    /// Session token signing secret (overrides VIDEO_STREAMING_TOKEN_SECRET)
    #[arg(long)]
    pub token_secret: Option<String>,

    /// Session token lifetime in seconds (overrides VIDEO_STREAMING_TOKEN_TTL_SECS)
    #[arg(long)]
    pub token_ttl_secs: Option<i64>,

    /// ffmpeg binary (overrides VIDEO_STREAMING_FFMPEG_PATH)
    #[arg(long)]
    pub ffmpeg_path: Option<String>,

    /// HLS segment duration in seconds (overrides VIDEO_STREAMING_HLS_SEGMENT_SECONDS)
    #[arg(long)]
    pub hls_segment_seconds: Option<u32>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();
        Self::merge(args)
    }

    fn merge(args: Args) -> Result<(Self, bool)> {
        // --- Environment fallback ---
        let env_host = env::var("VIDEO_STREAMING_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_env("VIDEO_STREAMING_PORT", 8080u16)?;
        let env_db = env::var("VIDEO_STREAMING_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/videos.db".into());
        let env_staging =
            env::var("VIDEO_STREAMING_STAGING_DIR").unwrap_or_else(|_| "./data/staging".into());
        let env_bucket = env::var("VIDEO_STREAMING_S3_BUCKET").ok();
        let env_region = env::var("VIDEO_STREAMING_AWS_REGION").ok();
        let env_endpoint = env::var("VIDEO_STREAMING_S3_ENDPOINT").ok();
        let env_secret = env::var("VIDEO_STREAMING_TOKEN_SECRET").ok();
        let env_ttl = parse_env("VIDEO_STREAMING_TOKEN_TTL_SECS", 86_400i64)?;
        let env_ffmpeg =
            env::var("VIDEO_STREAMING_FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".into());
        let env_segment = parse_env("VIDEO_STREAMING_HLS_SEGMENT_SECONDS", 10u32)?;

        // --- Merge (CLI wins over env, env over defaults) ---
        let Some(s3_bucket) = args.s3_bucket.or(env_bucket) else {
            bail!("missing S3 bucket: set VIDEO_STREAMING_S3_BUCKET or pass --s3-bucket");
        };
        let Some(aws_region) = args.aws_region.or(env_region) else {
            bail!("missing AWS region: set VIDEO_STREAMING_AWS_REGION or pass --aws-region");
        };
        let Some(token_secret) = args.token_secret.or(env_secret) else {
            bail!("missing token secret: set VIDEO_STREAMING_TOKEN_SECRET or pass --token-secret");
        };
        if token_secret.is_empty() {
            bail!("token secret must not be empty");
        }

        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            staging_dir: args.staging_dir.unwrap_or(env_staging),
            s3_bucket,
            aws_region,
            s3_endpoint: args.s3_endpoint.or(env_endpoint),
            token_secret,
            token_ttl_secs: args.token_ttl_secs.unwrap_or(env_ttl),
            ffmpeg_path: args.ffmpeg_path.unwrap_or(env_ffmpeg),
            hls_segment_seconds: args.hls_segment_seconds.unwrap_or(env_segment),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Manual Debug so the signing secret never reaches the logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("staging_dir", &self.staging_dir)
            .field("s3_bucket", &self.s3_bucket)
            .field("aws_region", &self.aws_region)
            .field("s3_endpoint", &self.s3_endpoint)
            .field("token_secret", &"***")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("ffmpeg_path", &self.ffmpeg_path)
            .field("hls_segment_seconds", &self.hls_segment_seconds)
            .finish()
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}
