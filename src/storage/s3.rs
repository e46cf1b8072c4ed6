//! S3-backed gateway implementation.

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{ObjectStoreExt, PutPayload};

use super::{GatewayError, GatewayResult, ObjectStorageGateway};

/// Gateway backed by an S3 (or S3-compatible) bucket.
#[derive(Clone)]
pub struct S3Gateway {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl S3Gateway {
    /// Build a gateway for `bucket` in `region`.
    ///
    /// Credentials come from the environment (the standard AWS variable
    /// set). `endpoint_url` switches to an S3-compatible provider such as
    /// MinIO; plain-http endpoints are allowed only in that case.
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> GatewayResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|err| GatewayError::Config(err.to_string()))?;

        Ok(Self {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }
}

#[async_trait]
impl ObjectStorageGateway for S3Gateway {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> GatewayResult<String> {
        let size = data.len() as u64;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        self.store
            .put(&location, PutPayload::from(Bytes::from(data)))
            .await
            .map_err(|err| {
                tracing::error!(
                    error = %err,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    "S3 upload failed"
                );
                GatewayError::PutFailed {
                    key: key.to_string(),
                    message: err.to_string(),
                }
            })?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format_public_url(&self.bucket, &self.region, self.endpoint_url.as_deref(), key)
    }
}

/// For AWS S3 the standard virtual-hosted form; for custom endpoints,
/// path-style for compatibility across providers.
fn format_public_url(bucket: &str, region: &str, endpoint: Option<&str>, key: &str) -> String {
    if let Some(endpoint) = endpoint {
        let base_url = endpoint.trim_end_matches('/');
        format!("{}/{}/{}", base_url, bucket, key)
    } else {
        format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aws_url_uses_virtual_hosted_style() {
        assert_eq!(
            format_public_url("clips", "eu-west-1", None, "abc/index.m3u8"),
            "https://clips.s3.eu-west-1.amazonaws.com/abc/index.m3u8"
        );
    }

    #[test]
    fn custom_endpoint_uses_path_style() {
        assert_eq!(
            format_public_url("clips", "local", Some("http://localhost:9000/"), "abc/seg0.ts"),
            "http://localhost:9000/clips/abc/seg0.ts"
        );
    }
}
