//! Object storage gateway abstraction.
//!
//! The ingestion pipeline only ever needs two capabilities from durable
//! storage: put a named byte payload, and derive the public locator of a
//! key. Keeping the trait this narrow lets tests substitute a recording
//! double and keeps the S3 client an implementation detail.

pub mod s3;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("upload of `{key}` failed: {message}")]
    PutFailed { key: String, message: String },
    #[error("invalid gateway configuration: {0}")]
    Config(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Uploads named byte payloads to a durable bucket.
#[async_trait]
pub trait ObjectStorageGateway: Send + Sync {
    /// Store `data` under `key` and return the object's public URL.
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str)
    -> GatewayResult<String>;

    /// Deterministic public URL for `key`, whether or not it exists yet.
    fn public_url(&self, key: &str) -> String;
}
