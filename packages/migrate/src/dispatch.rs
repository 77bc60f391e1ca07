//! Fixed-size worker pool over the work item arena.
//!
//! Items sit in a shared, immutable arena. Each worker claims the next
//! unclaimed index from an atomic cursor, so every item is processed by
//! exactly one worker and at most `num_workers` store operations are in
//! flight. Results go to the [`Reporter`] over a channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use depot_migrate_models::WorkItem;
use tokio::sync::mpsc;

use crate::report::Reporter;
use crate::retry::RetryPolicy;
use crate::store::ObjectStore;
use crate::upload;

/// Processes every item on `num_workers` concurrent workers, feeding
/// results to `reporter` as they complete.
///
/// Returns once every item has produced a result (or its worker has
/// died; see [`Reporter::finish`]).
pub async fn run(
    store: Arc<dyn ObjectStore>,
    items: Vec<WorkItem>,
    num_workers: usize,
    policy: RetryPolicy,
    reporter: &mut Reporter,
) {
    let arena: Arc<[WorkItem]> = items.into();
    let cursor = Arc::new(AtomicUsize::new(0));
    let workers = num_workers.clamp(1, arena.len().max(1));
    let (tx, rx) = mpsc::channel(workers * 2);

    log::info!(
        "Dispatching {} files to {workers} worker(s)...",
        arena.len()
    );

    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            let store = Arc::clone(&store);
            let arena = Arc::clone(&arena);
            let cursor = Arc::clone(&cursor);
            let tx = tx.clone();

            tokio::spawn(async move {
                loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(item) = arena.get(index) else {
                        break;
                    };
                    let result = upload::process(store.as_ref(), item.clone(), &policy).await;
                    if tx.send(result).await.is_err() {
                        break;
                    }
                }
                log::trace!("Worker {worker} finished");
            })
        })
        .collect();

    // Only the workers hold senders now, so `consume` ends when they do.
    drop(tx);
    reporter.consume(rx).await;

    for handle in handles {
        if let Err(e) = handle.await {
            log::error!("Upload worker terminated abnormally: {e}");
        }
    }
}
