//! `aws-sdk-s3` backed [`ObjectStore`].
//!
//! Works against AWS S3 and S3-compatible providers (`MinIO`, R2, Ceph, ...)
//! when an endpoint URL is configured. The SDK's own retry layer is
//! disabled; attempts are counted by [`crate::retry`].

use std::path::Path;

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{Credentials, StalledStreamProtectionConfig};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;

use super::ObjectStore;
use crate::config::StoreConfig;
use crate::error::StoreError;

/// Name reported for the static credentials built from the CLI.
const CREDENTIALS_PROVIDER: &str = "depot-migrate-cli";

/// S3 client bound to a single bucket.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    /// Builds a client from explicit credentials, region and optional
    /// endpoint. No request is sent until the first operation.
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        let creds = Credentials::new(
            &config.access_key,
            &config.secret_key,
            config.session_token.clone(),
            None,
            CREDENTIALS_PROVIDER,
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .region(Region::new(config.signing_region().to_string()))
            .credentials_provider(creds)
            .force_path_style(config.force_path_style)
            .retry_config(RetryConfig::disabled())
            .stalled_stream_protection(StalledStreamProtectionConfig::disabled());

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(HeadObjectError::is_not_found)
                {
                    return Ok(false);
                }
                Err(StoreError::Head {
                    bucket: self.bucket.clone(),
                    key: key.to_string(),
                    source: DisplayErrorContext(&err).to_string().into(),
                })
            }
        }
    }

    async fn put(&self, key: &str, local_path: &Path) -> Result<(), StoreError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StoreError::Body {
                path: local_path.to_path_buf(),
                source: Box::new(e),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type("application/octet-stream")
            .send()
            .await
            .map_err(|e| StoreError::Upload {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                source: DisplayErrorContext(&e).to_string().into(),
            })?;

        Ok(())
    }
}
