//! Per-file upload: existence-skip, then a bounded number of transfer
//! attempts.

use depot_migrate_models::{UploadResult, WorkItem};

use crate::retry::{RetryPolicy, retry};
use crate::store::ObjectStore;

/// Processes one work item to completion.
///
/// 1. Asks the store whether the key already exists (retried per `policy`).
///    An existing object is never overwritten: the item is skipped.
/// 2. If the check keeps failing, the item is uploaded anyway and a warning
///    says so.
/// 3. Otherwise the file is uploaded, retried per `policy`. Exhausting the
///    attempts yields a failed result carrying the last error.
pub async fn process(
    store: &dyn ObjectStore,
    item: WorkItem,
    policy: &RetryPolicy,
) -> UploadResult {
    let bucket = store.bucket();
    let key = item.remote_key.as_str();
    let path = item.local_path.as_path();
    let target = format!("s3://{bucket}/{key}");

    log::debug!("Uploading {} to path '{key}'", path.display());

    let label = format!("Existence check for {target}");
    let check = retry(policy, &label, |attempt| {
        log::debug!("Existence check for {target} (attempt {attempt})");
        store.exists(key)
    })
    .await;

    match check.result {
        Ok(true) => {
            log::debug!("Skipping {} - already exists at {target}", path.display());
            return UploadResult::skipped(item);
        }
        Ok(false) => {}
        Err(e) => {
            log::warn!(
                "Could not check whether {target} exists after {} attempt(s), \
                 uploading {} without the existence check: {e}",
                check.attempts,
                path.display()
            );
        }
    }

    let label = format!("Upload of {}", path.display());
    let transfer = retry(policy, &label, |attempt| {
        log::debug!("Upload attempt {attempt} for {} -> {target}", path.display());
        store.put(key, path)
    })
    .await;

    match transfer.result {
        Ok(()) => {
            log::debug!(
                "Uploaded {} to {target} ({} attempt(s))",
                path.display(),
                transfer.attempts
            );
            UploadResult::uploaded(item, transfer.attempts)
        }
        Err(e) => {
            log::error!(
                "Failed to upload {} after {} attempt(s): {e}",
                path.display(),
                transfer.attempts
            );
            UploadResult::failed(item, transfer.attempts, e.to_string())
        }
    }
}
