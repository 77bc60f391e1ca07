//! Validated run configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::MigrateError;
use crate::retry::{Backoff, RetryPolicy};

/// Default number of concurrent upload workers.
pub const DEFAULT_NUM_WORKERS: usize = 4;

/// Total attempts (initial + retries) for each store operation.
pub const MAX_ATTEMPTS: u32 = 3;

/// Delay between attempts of a failed store operation.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Region used for request signing when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Log file receiving the fine-grained run detail.
pub const DEFAULT_LOG_FILE: &str = "s3_migration.log";

/// Connection settings for the target bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub bucket: String,
    /// Custom endpoint URL for non-AWS providers.
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
    /// Address the bucket as `endpoint/bucket` instead of `bucket.endpoint`.
    pub force_path_style: bool,
}

impl StoreConfig {
    /// Region the client signs requests for.
    #[must_use]
    pub fn signing_region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    fn validate(&self) -> Result<(), MigrateError> {
        if self.bucket.trim().is_empty() {
            return Err(MigrateError::configuration("bucket name must not be empty"));
        }
        if self.access_key.is_empty() {
            return Err(MigrateError::configuration("access key must not be empty"));
        }
        if self.secret_key.is_empty() {
            return Err(MigrateError::configuration("secret key must not be empty"));
        }
        if let Some(endpoint) = &self.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(MigrateError::configuration(format!(
                "endpoint URL '{endpoint}' must start with http:// or https://"
            )));
        }
        if self.region.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return Err(MigrateError::configuration("region must not be empty"));
        }
        Ok(())
    }
}

/// Everything a migration run needs.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Local folder whose files are migrated.
    pub local_root: PathBuf,
    /// Directory keys are computed relative to. Defaults to the parent of
    /// `local_root`, which makes the folder's own name the first key segment.
    pub strip_prefix: Option<PathBuf>,
    /// Prefix placed in front of every key.
    pub prepend_path: String,
    pub num_workers: usize,
    pub retry: RetryPolicy,
    pub store: StoreConfig,
}

impl MigrationConfig {
    /// Creates a configuration with the default worker count and retry
    /// policy.
    #[must_use]
    pub const fn new(local_root: PathBuf, prepend_path: String, store: StoreConfig) -> Self {
        Self {
            local_root,
            strip_prefix: None,
            prepend_path,
            num_workers: DEFAULT_NUM_WORKERS,
            retry: RetryPolicy {
                max_attempts: MAX_ATTEMPTS,
                backoff: Backoff::Fixed(DEFAULT_RETRY_DELAY),
            },
            store,
        }
    }

    /// Checks the settings that do not touch the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Configuration`] describing the first invalid
    /// setting.
    pub fn validate(&self) -> Result<(), MigrateError> {
        if self.num_workers == 0 {
            return Err(MigrateError::configuration(
                "worker count must be at least 1",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(MigrateError::configuration(
                "attempt count must be at least 1",
            ));
        }
        self.store.validate()
    }
}
