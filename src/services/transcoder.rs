//! External transcoding invoker.
//!
//! Format conversion is delegated to an ffmpeg subprocess behind a narrow
//! trait, so tests (and eventually remote transcoders) can substitute their
//! own implementation. The process exit status is the only signal consulted;
//! stderr is captured for the logs.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to launch transcoder: {0}")]
    Launch(#[from] std::io::Error),
    #[error("transcoder exited with status {code:?}")]
    Failed { code: Option<i32>, stderr: String },
    #[error("invalid transcoder binary path")]
    InvalidBinaryPath,
}

/// Converts a staged input file into a segmented streaming layout inside
/// `output_dir`: one `index.m3u8` manifest plus `.ts` media segments.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(
        &self,
        input: &Path,
        output_dir: &Path,
        segment_seconds: u32,
    ) -> Result<(), TranscodeError>;
}

/// HLS transcoder shelling out to ffmpeg.
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: String) -> Result<Self, TranscodeError> {
        // The path ends up on a command line; refuse shell metacharacters.
        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if ffmpeg_path.is_empty()
            || ffmpeg_path.chars().any(|c| dangerous_chars.contains(&c))
        {
            return Err(TranscodeError::InvalidBinaryPath);
        }

        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(
        &self,
        input: &Path,
        output_dir: &Path,
        segment_seconds: u32,
    ) -> Result<(), TranscodeError> {
        let playlist_path = output_dir.join("index.m3u8");

        // Stream copy into fixed-duration segments with an unbounded
        // playlist: every segment stays listed, none are evicted.
        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args(["-c:v", "copy", "-c:a", "copy"])
            .args(["-start_number", "0"])
            .args(["-hls_time", &segment_seconds.to_string()])
            .args(["-hls_list_size", "0"])
            .args(["-f", "hls"])
            .arg(&playlist_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!(
                status = ?output.status.code(),
                stderr = %stderr,
                "ffmpeg invocation failed"
            );
            return Err(TranscodeError::Failed {
                code: output.status.code(),
                stderr,
            });
        }

        Ok(())
    }
}
