#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the depot S3 migration tool.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use depot_migrate::config::{DEFAULT_LOG_FILE, DEFAULT_NUM_WORKERS};
use depot_migrate::retry::Backoff;
use depot_migrate::{MigrateError, MigrationConfig, S3Store, StoreConfig};
use depot_migrate_cli_utils::IndicatifProgress;
use depot_migrate_models::RunSummary;

#[derive(Parser)]
#[command(
    name = "depot_migrate",
    about = "Migrate a depot's local archive folder to an S3 bucket"
)]
struct Cli {
    /// Path to the local folder
    #[arg(long, alias = "local_folder")]
    local_folder: PathBuf,
    /// S3 endpoint URL (not required for AWS)
    #[arg(long, alias = "s3_url", env = "AWS_ENDPOINT_URL")]
    s3_url: Option<String>,
    /// AWS region (only required if using AWS S3)
    #[arg(long, alias = "aws_region", env = "AWS_REGION")]
    aws_region: Option<String>,
    /// S3 bucket name
    #[arg(long, alias = "bucket_name")]
    bucket_name: String,
    /// Access key
    #[arg(
        long,
        alias = "access_key",
        env = "AWS_ACCESS_KEY_ID",
        hide_env_values = true
    )]
    access_key: String,
    /// Secret key
    #[arg(
        long,
        alias = "secret_key",
        env = "AWS_SECRET_ACCESS_KEY",
        hide_env_values = true
    )]
    secret_key: String,
    /// Path to prepend to every S3 key
    #[arg(long, alias = "prepend_path")]
    prepend_path: String,
    /// Session token (if required by the S3 provider)
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Number of concurrent upload workers
    #[arg(long, alias = "num_workers", default_value_t = DEFAULT_NUM_WORKERS)]
    num_workers: usize,
    /// Directory keys are computed relative to (default: parent of the local folder)
    #[arg(long)]
    strip_prefix: Option<PathBuf>,
    /// Seconds to wait between attempts of a failed upload
    #[arg(long, default_value_t = 2)]
    retry_delay_secs: u64,
    /// File receiving the detailed log
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,
    /// Use path-style bucket addressing (default: on when `--s3-url` is set)
    #[arg(long)]
    force_path_style: Option<bool>,
}

impl Cli {
    fn into_config(self) -> MigrationConfig {
        let has_endpoint = self.s3_url.is_some();
        let force_path_style = self.force_path_style.unwrap_or(has_endpoint);
        let store = StoreConfig {
            bucket: self.bucket_name,
            endpoint: self.s3_url,
            region: self.aws_region,
            access_key: self.access_key,
            secret_key: self.secret_key,
            session_token: self.token,
            force_path_style,
        };

        let mut config = MigrationConfig::new(self.local_folder, self.prepend_path, store);
        config.strip_prefix = self.strip_prefix;
        config.num_workers = self.num_workers;
        config.retry.backoff = Backoff::Fixed(Duration::from_secs(self.retry_delay_secs));
        config
    }
}

/// Process exit status for a finished run.
const EXIT_SUCCESS: u8 = 0;
/// Process exit status when the run could not start or was aborted.
const EXIT_FAILURE: u8 = 1;

async fn run(cli: Cli) -> Result<RunSummary, MigrateError> {
    let multi = depot_migrate_cli_utils::init_logger(&cli.log_file).map_err(|source| {
        MigrateError::LogFile {
            path: cli.log_file.clone(),
            source,
        }
    })?;
    log::info!("See {} for more detailed logs", cli.log_file.display());

    let config = cli.into_config();
    config.validate()?;

    let store = Arc::new(S3Store::new(&config.store));
    let progress = IndicatifProgress::files_bar(&multi, "Processing files", 0);

    depot_migrate::migrate(&config, store, progress).await
}

/// Prints the outcome of a run and maps it to the process exit status.
///
/// Per-file failures still exit successfully; only a run that could not
/// complete its pipeline fails.
fn exit_status(result: Result<RunSummary, MigrateError>) -> u8 {
    match result {
        Ok(summary) => {
            if summary.has_failures() {
                println!("Completed with failures: {summary}");
            } else {
                println!("Completed successfully: {summary}");
            }
            println!("{}", summary.address);
            EXIT_SUCCESS
        }
        Err(e @ MigrateError::LogFile { .. }) => {
            eprintln!("Error: {e}");
            EXIT_FAILURE
        }
        Err(e) => {
            log::error!("{e}");
            EXIT_FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    ExitCode::from(exit_status(run(cli).await))
}

#[cfg(test)]
mod tests {
    use depot_migrate_models::progress::null_progress;

    use super::*;

    const REQUIRED: [&str; 11] = [
        "depot_migrate",
        "--local-folder",
        "/p4/depots/main",
        "--bucket-name",
        "depot-archive",
        "--access-key",
        "AKIDEXAMPLE",
        "--secret-key",
        "wJalrXUtnFEMI",
        "--prepend-path",
        "archive",
    ];

    fn parse(extra: &[&str]) -> Cli {
        Cli::try_parse_from(REQUIRED.iter().chain(extra)).unwrap()
    }

    #[test]
    fn underscore_aliases_are_accepted() {
        let cli = Cli::try_parse_from([
            "depot_migrate",
            "--local_folder",
            "/p4/depots/main",
            "--bucket_name",
            "depot-archive",
            "--access_key",
            "AKIDEXAMPLE",
            "--secret_key",
            "wJalrXUtnFEMI",
            "--prepend_path",
            "archive",
            "--num_workers",
            "8",
            "--s3_url",
            "http://minio.local:9000",
            "--aws_region",
            "eu-west-1",
        ])
        .unwrap();

        let config = cli.into_config();
        assert_eq!(config.local_root, PathBuf::from("/p4/depots/main"));
        assert_eq!(config.prepend_path, "archive");
        assert_eq!(config.num_workers, 8);
        assert_eq!(config.store.bucket, "depot-archive");
        assert_eq!(config.store.access_key, "AKIDEXAMPLE");
        assert_eq!(config.store.secret_key, "wJalrXUtnFEMI");
        assert_eq!(config.store.region.as_deref(), Some("eu-west-1"));
        let endpoint = config.store.endpoint.as_deref();
        assert_eq!(endpoint, Some("http://minio.local:9000"));
    }

    #[test]
    fn endpoint_enables_path_style_by_default() {
        let cli = parse(&["--s3-url", "http://minio.local:9000"]);
        assert!(cli.into_config().store.force_path_style);

        let cli = parse(&[
            "--s3-url",
            "http://minio.local:9000",
            "--force-path-style",
            "false",
        ]);
        let config = cli.into_config();
        assert!(!config.store.force_path_style);
    }

    #[test]
    fn retry_delay_sets_fixed_backoff() {
        let config = parse(&["--retry-delay-secs", "5"]).into_config();
        let five_secs = Backoff::Fixed(Duration::from_secs(5));
        assert_eq!(config.retry.backoff, five_secs);
        assert_eq!(config.retry.max_attempts, 3);

        let config = parse(&[]).into_config();
        let two_secs = Backoff::Fixed(Duration::from_secs(2));
        assert_eq!(config.retry.backoff, two_secs);
        assert_eq!(config.num_workers, DEFAULT_NUM_WORKERS);
    }

    #[test]
    fn missing_required_flag_is_rejected() {
        assert!(Cli::try_parse_from(&REQUIRED[..REQUIRED.len() - 2]).is_err());
    }

    #[tokio::test]
    async fn missing_root_exits_with_failure() {
        let root = std::env::temp_dir().join("depot_migrate_main_missing");
        let _ = std::fs::remove_dir_all(&root);
        let mut cli = parse(&[]);
        cli.local_folder = root;

        let config = cli.into_config();
        let store = Arc::new(S3Store::new(&config.store));
        let progress = null_progress();
        let result = depot_migrate::migrate(&config, store, progress).await;

        assert!(matches!(result, Err(MigrateError::RootNotFound { .. })));
        assert_eq!(exit_status(result), EXIT_FAILURE);
    }

    #[test]
    fn failed_files_still_exit_successfully() {
        let summary = RunSummary {
            total: 2,
            uploaded: 0,
            skipped: 0,
            failed: 2,
            address: "s3,bucket:depot-archive".to_string(),
        };
        assert_eq!(exit_status(Ok(summary)), EXIT_SUCCESS);

        let error = MigrateError::Configuration {
            message: "worker count must be at least 1".to_string(),
        };
        assert_eq!(exit_status(Err(error)), EXIT_FAILURE);
    }
}
