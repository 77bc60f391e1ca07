//! Local path → object key mapping.
//!
//! A key is `<prepend path>/<file path relative to the strip prefix>`, with
//! every separator normalized to `/`. The strip prefix defaults to the
//! parent of the local folder, so for a local folder `/p4/depots/main`, a
//! prepend path of `archive` and a file `/p4/depots/main/src/lib.c,v` the
//! key is `archive/main/src/lib.c,v`.

use std::path::{Component, Path, PathBuf};

use crate::error::MigrateError;

/// Maps files under one local folder to object keys.
#[derive(Debug, Clone)]
pub struct KeyMapper {
    root: PathBuf,
    base: PathBuf,
    prepend: Vec<String>,
}

impl KeyMapper {
    /// Creates a mapper for files under `root`.
    ///
    /// `strip_prefix` must be `root` or one of its ancestors; when `None`,
    /// the parent of `root` is used (or `root` itself if it has no parent).
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Configuration`] if `strip_prefix` does not
    /// contain `root`.
    pub fn new(
        root: &Path,
        strip_prefix: Option<&Path>,
        prepend_path: &str,
    ) -> Result<Self, MigrateError> {
        let base = match strip_prefix {
            Some(prefix) => {
                if !root.starts_with(prefix) {
                    return Err(MigrateError::configuration(format!(
                        "strip prefix {} does not contain the local folder {}",
                        prefix.display(),
                        root.display()
                    )));
                }
                prefix.to_path_buf()
            }
            None => root.parent().unwrap_or(root).to_path_buf(),
        };

        let prepend = prepend_path
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .map(str::to_string)
            .collect();

        Ok(Self {
            root: root.to_path_buf(),
            base,
            prepend,
        })
    }

    /// Returns the object key for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::PathOutsideRoot`] if `path` is not under the
    /// local folder, or [`MigrateError::NonUtf8Path`] if a component is not
    /// valid UTF-8.
    pub fn remote_key(&self, path: &Path) -> Result<String, MigrateError> {
        let outside = || MigrateError::PathOutsideRoot {
            path: path.to_path_buf(),
            root: self.root.clone(),
        };

        if !path.starts_with(&self.root) {
            return Err(outside());
        }
        let relative = path.strip_prefix(&self.base).map_err(|_| outside())?;

        let mut segments = self.prepend.clone();
        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str().ok_or_else(|| MigrateError::NonUtf8Path {
                        path: path.to_path_buf(),
                    })?;
                    segments.push(name.to_string());
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(outside());
                }
            }
        }

        Ok(segments.join("/"))
    }
}
