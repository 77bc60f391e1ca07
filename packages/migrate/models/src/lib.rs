#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Work item, upload result, and run summary types for depot migration.
//!
//! A migration run turns every regular file under the local root into one
//! [`WorkItem`], processes each item exactly once into an [`UploadResult`],
//! and folds the results into a single [`RunSummary`].

pub mod progress;

use std::fmt;
use std::path::PathBuf;

use strum_macros::Display;

/// One unit of migration work: a local file and the key it is uploaded to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    /// Absolute path of the local file.
    pub local_path: PathBuf,
    /// Full object key in the bucket.
    pub remote_key: String,
}

/// Final outcome of processing a [`WorkItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    /// The file was transferred to the bucket.
    Uploaded,
    /// An object already existed under the key; nothing was transferred.
    Skipped,
    /// Every transfer attempt failed.
    Failed,
}

/// Result of processing a single [`WorkItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// The item that was processed.
    pub item: WorkItem,
    /// What happened to it.
    pub outcome: Outcome,
    /// Number of transfer attempts made (0 when skipped).
    pub attempts: u32,
    /// Message of the last error, if the item failed.
    pub error: Option<String>,
}

impl UploadResult {
    #[must_use]
    pub const fn uploaded(item: WorkItem, attempts: u32) -> Self {
        Self {
            item,
            outcome: Outcome::Uploaded,
            attempts,
            error: None,
        }
    }

    #[must_use]
    pub const fn skipped(item: WorkItem) -> Self {
        Self {
            item,
            outcome: Outcome::Skipped,
            attempts: 0,
            error: None,
        }
    }

    #[must_use]
    pub const fn failed(item: WorkItem, attempts: u32, error: String) -> Self {
        Self {
            item,
            outcome: Outcome::Failed,
            attempts,
            error: Some(error),
        }
    }
}

/// Aggregate counters for a whole run plus the depot address string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of work items enumerated.
    pub total: u64,
    /// Number of items uploaded.
    pub uploaded: u64,
    /// Number of items skipped because they already existed remotely.
    pub skipped: u64,
    /// Number of items that exhausted their retry budget.
    pub failed: u64,
    /// Address string for the depot configuration record.
    pub address: String,
}

impl RunSummary {
    /// Creates an empty summary for a run of `total` items.
    #[must_use]
    pub fn new(total: u64, address: String) -> Self {
        Self {
            total,
            address,
            ..Self::default()
        }
    }

    /// Counts one result under its outcome.
    pub const fn record(&mut self, result: &UploadResult) {
        match result.outcome {
            Outcome::Uploaded => self.uploaded += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    /// Number of items that have produced a result so far.
    #[must_use]
    pub const fn processed(&self) -> u64 {
        self.uploaded + self.skipped + self.failed
    }

    /// Whether every enumerated item has been accounted for.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.processed() == self.total
    }

    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} uploaded, {} skipped, {} failed",
            self.uploaded, self.total, self.skipped, self.failed
        )
    }
}
