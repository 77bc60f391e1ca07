//! Enumerates the local folder and builds the work item list.
//!
//! Symbolic links are never followed: a link (to a file or a directory) is
//! logged and skipped, as are sockets, FIFOs and device files. Only regular
//! files become work items.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use depot_migrate_models::WorkItem;
use walkdir::WalkDir;

use crate::config::MigrationConfig;
use crate::error::MigrateError;
use crate::keys::KeyMapper;

/// Checks that `path` is a readable directory and returns its canonical
/// form.
///
/// # Errors
///
/// Returns [`MigrateError::RootNotFound`], [`MigrateError::RootNotDirectory`]
/// or [`MigrateError::RootUnreadable`].
pub fn resolve_root(path: &Path) -> Result<PathBuf, MigrateError> {
    let meta = std::fs::metadata(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            MigrateError::RootNotFound {
                path: path.to_path_buf(),
            }
        } else {
            MigrateError::RootUnreadable {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if !meta.is_dir() {
        return Err(MigrateError::RootNotDirectory {
            path: path.to_path_buf(),
        });
    }

    let unreadable = |e| MigrateError::RootUnreadable {
        path: path.to_path_buf(),
        source: e,
    };
    std::fs::read_dir(path).map_err(unreadable)?;
    std::fs::canonicalize(path).map_err(unreadable)
}

/// Recursively lists every regular file under `root`, sorted by path.
///
/// Entries that cannot be read are logged and skipped.
#[must_use]
pub fn enumerate(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_file() {
            files.push(entry.into_path());
        } else if file_type.is_symlink() {
            log::debug!("Skipping symbolic link {}", entry.path().display());
        } else if !file_type.is_dir() {
            log::debug!("Skipping special file {}", entry.path().display());
        }
    }

    files.sort();
    files
}

/// Resolves the local folder, enumerates it, and maps every file to its
/// key.
///
/// Runs entirely before any network call, so a bad folder or a bad mapping
/// aborts the run with nothing uploaded.
///
/// # Errors
///
/// Returns the [`MigrateError`] from [`resolve_root`] or from key mapping.
pub async fn plan(config: &MigrationConfig) -> Result<Vec<WorkItem>, MigrateError> {
    let root = resolve_root(&config.local_root)?;
    let strip_prefix = config
        .strip_prefix
        .as_deref()
        .map(std::fs::canonicalize)
        .transpose()
        .map_err(|e| MigrateError::configuration(format!("cannot resolve strip prefix: {e}")))?;
    let mapper = KeyMapper::new(&root, strip_prefix.as_deref(), &config.prepend_path)?;

    log::info!("Enumerating files under {} ...", root.display());
    let walk_root = root.clone();
    let files = tokio::task::spawn_blocking(move || enumerate(&walk_root))
        .await
        .map_err(std::io::Error::other)?;

    files
        .into_iter()
        .map(|local_path| -> Result<WorkItem, MigrateError> {
            let remote_key = mapper.remote_key(&local_path)?;
            Ok(WorkItem {
                local_path,
                remote_key,
            })
        })
        .collect()
}
