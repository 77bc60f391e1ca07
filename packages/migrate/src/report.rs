//! Result aggregation, progress, and the final summary.

use std::sync::Arc;

use depot_migrate_models::progress::ProgressCallback;
use depot_migrate_models::{Outcome, RunSummary, UploadResult};
use tokio::sync::mpsc;

use crate::config::StoreConfig;

/// Builds the depot `Address:` value for the migrated bucket.
///
/// Credentials are included verbatim; the operator pastes this string into
/// the depot spec.
#[must_use]
pub fn address_string(config: &StoreConfig) -> String {
    let mut parts = vec!["s3".to_string()];

    if let Some(endpoint) = &config.endpoint {
        parts.push(format!("url:{endpoint}"));
    }
    match (&config.region, &config.endpoint) {
        (Some(region), _) => parts.push(format!("region:{region}")),
        (None, None) => parts.push(format!("region:{}", config.signing_region())),
        (None, Some(_)) => {}
    }
    parts.push(format!("bucket:{}", config.bucket));
    parts.push(format!("accessKey:{}", config.access_key));
    parts.push(format!("secretKey:{}", config.secret_key));
    if let Some(token) = &config.session_token {
        parts.push(format!("token:{token}"));
    }

    parts.join(",")
}

/// Single consumer of upload results.
///
/// Owns the [`RunSummary`]; workers only ever send results over a channel,
/// so counters are never shared between tasks.
pub struct Reporter {
    summary: RunSummary,
    failures: Vec<UploadResult>,
    progress: Arc<dyn ProgressCallback>,
}

impl Reporter {
    #[must_use]
    pub fn new(total: u64, address: String, progress: Arc<dyn ProgressCallback>) -> Self {
        progress.set_total(total);
        progress.set_message("Processing files".to_string());
        Self {
            summary: RunSummary::new(total, address),
            failures: Vec::new(),
            progress,
        }
    }

    /// Records one completed item.
    pub fn record(&mut self, result: UploadResult) {
        log::debug!(
            "{} -> {}: {} ({} attempt(s))",
            result.item.local_path.display(),
            result.item.remote_key,
            result.outcome,
            result.attempts
        );

        self.summary.record(&result);
        self.progress.inc(1);

        if result.outcome == Outcome::Failed {
            self.failures.push(result);
        }
    }

    /// Records results until every sender has been dropped.
    pub async fn consume(&mut self, mut results: mpsc::Receiver<UploadResult>) {
        while let Some(result) = results.recv().await {
            self.record(result);
        }
    }

    /// Logs every failure and the depot configuration hint, then returns
    /// the final summary.
    #[must_use]
    pub fn finish(self) -> RunSummary {
        let Self {
            summary,
            failures,
            progress,
        } = self;

        progress.finish(summary.to_string());

        if !summary.is_complete() {
            log::error!(
                "Only {} of {} files produced a result",
                summary.processed(),
                summary.total
            );
        }

        if !failures.is_empty() {
            log::warn!("{} file(s) could not be uploaded:", failures.len());
            for failure in &failures {
                log::error!(
                    "  {} -> {}: {}",
                    failure.item.local_path.display(),
                    failure.item.remote_key,
                    failure.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        log::info!("Set the depot Address with `p4 depot` (printed below)");
        log::debug!("Address:\t{}", summary.address);

        summary
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use depot_migrate_models::WorkItem;
    use depot_migrate_models::progress::null_progress;

    use super::*;
    use crate::testing::store_config;

    #[test]
    fn aws_address_includes_region() {
        let address = address_string(&store_config());
        assert_eq!(
            address,
            "s3,region:eu-west-1,bucket:depot-archive,accessKey:AKIDEXAMPLE,secretKey:wJalrXUtnFEMI"
        );
    }

    #[test]
    fn aws_address_without_region_uses_default() {
        let mut config = store_config();
        config.region = None;
        assert!(address_string(&config).starts_with("s3,region:us-east-1,bucket:depot-archive,"));
    }

    #[test]
    fn endpoint_address_is_url_qualified() {
        let mut config = store_config();
        config.endpoint = Some("https://minio.internal:9000".to_string());
        config.region = None;
        config.session_token = Some("SESSION".to_string());
        assert_eq!(
            address_string(&config),
            "s3,url:https://minio.internal:9000,bucket:depot-archive,\
             accessKey:AKIDEXAMPLE,secretKey:wJalrXUtnFEMI,token:SESSION"
        );
    }

    #[tokio::test]
    async fn consume_counts_in_completion_order() {
        let (tx, rx) = mpsc::channel(4);
        let mut reporter = Reporter::new(3, "s3".to_string(), null_progress());

        let item = |name: &str| WorkItem {
            local_path: PathBuf::from("/p4/depots/main").join(name),
            remote_key: format!("archive/main/{name}"),
        };
        tx.send(UploadResult::failed(item("c"), 3, "boom".to_string()))
            .await
            .unwrap();
        tx.send(UploadResult::uploaded(item("a"), 1)).await.unwrap();
        tx.send(UploadResult::skipped(item("b"))).await.unwrap();
        drop(tx);

        reporter.consume(rx).await;

        let summary = reporter.finish();
        assert!(summary.is_complete());
        assert_eq!(summary.to_string(), "1/3 uploaded, 1 skipped, 1 failed");
        assert_eq!(summary.address, "s3");
    }
}
