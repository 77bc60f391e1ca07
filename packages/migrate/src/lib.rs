#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Migrates a depot's local archive folder to an S3-compatible bucket.
//!
//! Every regular file under the local folder is uploaded to
//! `<prepend path>/<folder name>/<relative path>`, preserving the directory
//! structure so the depot can afterwards be served from the bucket.
//!
//! ## Pipeline
//!
//! 1. [`walk::plan`] enumerates the folder and maps each file to a key.
//!    Nothing touches the network until this succeeds.
//! 2. [`dispatch::run`] processes the items on a fixed pool of workers.
//!    Each worker runs [`upload::process`]: skip when the key already
//!    exists, otherwise upload with up to three attempts.
//! 3. [`report::Reporter`] counts results as they complete, logs any
//!    failures, and returns the [`RunSummary`] carrying the depot
//!    `Address:` string.
//!
//! A failed file never aborts the run; only configuration problems (a
//! missing folder, invalid flags, an impossible key mapping) are fatal.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod keys;
pub mod report;
pub mod retry;
pub mod store;
pub mod upload;
pub mod walk;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use depot_migrate_models::RunSummary;
use depot_migrate_models::progress::ProgressCallback;

pub use self::config::{MigrationConfig, StoreConfig};
pub use self::error::{MigrateError, StoreError};
pub use self::store::{ObjectStore, S3Store};

/// Runs a full migration against `store`.
///
/// # Errors
///
/// Returns a [`MigrateError`] if the configuration is invalid, the local
/// folder is missing or unreadable, or a file cannot be mapped to a key.
/// Per-file upload failures are not errors; they are counted in the
/// returned [`RunSummary`].
pub async fn migrate(
    config: &MigrationConfig,
    store: Arc<dyn ObjectStore>,
    progress: Arc<dyn ProgressCallback>,
) -> Result<RunSummary, MigrateError> {
    config.validate()?;

    let items = walk::plan(config).await?;

    log::info!(
        "Beginning upload of {} to s3 bucket: '{}'",
        config.local_root.display(),
        store.bucket()
    );
    log::info!("Prepending path: '{}' to S3 keys", config.prepend_path);
    log::info!("Found {} files to process", items.len());

    let mut reporter = report::Reporter::new(
        items.len() as u64,
        report::address_string(&config.store),
        progress,
    );
    dispatch::run(
        store,
        items,
        config.num_workers,
        config.retry,
        &mut reporter,
    )
    .await;

    Ok(reporter.finish())
}
