//! Error types for the migration run.

use std::path::PathBuf;

/// Fatal errors that abort the run before any upload work begins.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// A required setting is missing or invalid.
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// What is wrong with the configuration.
        message: String,
    },

    /// The local folder does not exist.
    #[error("Local folder {} does not exist", path.display())]
    RootNotFound {
        /// Path that was given as the local folder.
        path: PathBuf,
    },

    /// The local folder exists but is not a directory.
    #[error("Local folder {} is not a directory", path.display())]
    RootNotDirectory {
        /// Path that was given as the local folder.
        path: PathBuf,
    },

    /// The local folder could not be read.
    #[error("Local folder {} is not readable: {source}", path.display())]
    RootUnreadable {
        /// Path that was given as the local folder.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file to migrate does not lie under the local folder.
    #[error("{} is not under the local folder {}", path.display(), root.display())]
    PathOutsideRoot {
        /// Offending file path.
        path: PathBuf,
        /// The local folder.
        root: PathBuf,
    },

    /// A path component cannot be expressed as an object key.
    #[error("{} contains a non UTF-8 component", path.display())]
    NonUtf8Path {
        /// Offending file path.
        path: PathBuf,
    },

    /// The log file could not be opened.
    #[error("Cannot open log file {}: {source}", path.display())]
    LogFile {
        /// Log file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Other local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrateError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Errors returned by an [`crate::store::ObjectStore`].
///
/// All variants are retried the same way; once the retry budget is spent
/// the file is recorded as failed and the run continues.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `HeadObject` failed with something other than "not found".
    #[error("Failed to head s3://{bucket}/{key}: {source}")]
    Head {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// `PutObject` failed.
    #[error("Failed to upload s3://{bucket}/{key}: {source}")]
    Upload {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The local file could not be opened for streaming.
    #[error("Failed to read {}: {source}", path.display())]
    Body {
        /// Local file path.
        path: PathBuf,
        /// Underlying error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
