//! The object-store seam used by the uploader.
//!
//! [`S3Store`] is the production implementation; tests substitute an
//! in-memory store.

mod s3;

use std::path::Path;

use async_trait::async_trait;

pub use self::s3::S3Store;
use crate::error::StoreError;

/// Operations the migration needs from an object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the target bucket.
    fn bucket(&self) -> &str;

    /// Returns whether an object already exists under `key`.
    ///
    /// "Not found" is `Ok(false)`, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Head`] for any other failure.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Uploads the contents of `local_path` to `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Body`] if the file cannot be read, or
    /// [`StoreError::Upload`] if the transfer fails.
    async fn put(&self, key: &str, local_path: &Path) -> Result<(), StoreError>;
}
