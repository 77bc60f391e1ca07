#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI plumbing for the depot migration tool.
//!
//! Provides an `indicatif`-backed [`ProgressCallback`] plus [`init_logger`],
//! which sends coarse-grained output to the console and every record at
//! `debug` and above to a log file. Both sinks sit behind
//! `indicatif-log-bridge` so log lines are suspended while the progress bar
//! redraws.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use depot_migrate_models::progress::ProgressCallback;
use env_logger::{Target, WriteStyle};
use indicatif::{ProgressBar, ProgressStyle};
use log::{LevelFilter, Log};

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] that implements [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    /// Creates a bar counting processed files. The total is usually known
    /// up front; [`ProgressCallback::set_total()`] can still adjust it.
    #[must_use]
    pub fn files_bar(
        multi: &MultiProgress,
        message: &str,
        total: u64,
    ) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new(total));
        bar.set_style(
            ProgressStyle::with_template(
                "{msg} {wide_bar:.cyan/dim} {pos}/{len} {percent}% [{elapsed_precise} / {eta}]",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
        );
        bar.set_message(message.to_string());

        Arc::new(Self { bar })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Forwards each record to the console logger and the file logger, each
/// applying its own filter.
struct TeeLogger {
    console: env_logger::Logger,
    file: env_logger::Logger,
}

impl TeeLogger {
    fn max_level(&self) -> LevelFilter {
        self.console.filter().max(self.file.filter())
    }
}

impl Log for TeeLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.console.enabled(metadata) || self.file.enabled(metadata)
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.console.matches(record) {
            self.console.log(record);
        }
        if self.file.matches(record) {
            self.file.log(record);
        }
    }

    fn flush(&self) {
        self.console.flush();
        self.file.flush();
    }
}

/// Initializes the global logger: `info` and above on the console
/// (overridable with `RUST_LOG`), `debug` and above appended to `log_file`.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
///
/// # Errors
///
/// Returns an I/O error if `log_file` cannot be opened for appending.
pub fn init_logger(log_file: &Path) -> std::io::Result<MultiProgress> {
    let multi = MultiProgress::new();

    let console = pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let file = env_logger::Builder::new()
        .filter_level(LevelFilter::Debug)
        // TLS handshake chatter drowns out the per-file records.
        .filter_module("rustls", LevelFilter::Warn)
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .build();

    let logger = TeeLogger { console, file };
    let level = logger.max_level();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)

    log::set_max_level(level);

    Ok(multi)
}
