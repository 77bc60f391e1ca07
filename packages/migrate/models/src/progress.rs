//! Progress reporting trait for the upload run.
//!
//! [`ProgressCallback`] keeps the reporter independent of any rendering
//! backend. The `indicatif` implementation lives in
//! `depot_migrate_cli_utils`; tests and quiet runs use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates as work items complete.
///
/// Implementations must be `Send + Sync` so they can be shared with the
/// reporter task behind an `Arc`.
pub trait ProgressCallback: Send + Sync {
    /// Set the total number of work items (enables percentage/ETA).
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` items.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// A [`ProgressCallback`] that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
