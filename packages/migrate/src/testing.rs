use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{MigrationConfig, StoreConfig};
use crate::error::StoreError;
use crate::retry::{Backoff, RetryPolicy};
use crate::store::ObjectStore;

pub const NO_DELAY: RetryPolicy = RetryPolicy {
    max_attempts: 3,
    backoff: Backoff::Fixed(Duration::ZERO),
};

pub fn store_config() -> StoreConfig {
    StoreConfig {
        bucket: "depot-archive".to_string(),
        endpoint: None,
        region: Some("eu-west-1".to_string()),
        access_key: "AKIDEXAMPLE".to_string(),
        secret_key: "wJalrXUtnFEMI".to_string(),
        session_token: None,
        force_path_style: false,
    }
}

pub fn migration_config(root: &Path) -> MigrationConfig {
    let mut config =
        MigrationConfig::new(root.to_path_buf(), "archive".to_string(), store_config());
    config.retry = NO_DELAY;
    config
}

/// Fresh, empty directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("depot_migrate_test_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Creates each relative path under `root` as a small file.
pub fn write_tree(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, file.as_bytes()).unwrap();
    }
}

/// In-memory [`ObjectStore`] that records every call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashSet<String>>,
    failing_puts: HashSet<String>,
    failing_heads: HashSet<String>,
    put_attempts: Mutex<HashMap<String, u32>>,
    head_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    latency: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::default();
        store
            .objects
            .lock()
            .unwrap()
            .extend(keys.into_iter().map(Into::into));
        store
    }

    /// Every upload of `key` fails.
    pub fn fail_puts_for(mut self, key: &str) -> Self {
        self.failing_puts.insert(key.to_string());
        self
    }

    /// Every existence check of `key` fails.
    pub fn fail_heads_for(mut self, key: &str) -> Self {
        self.failing_heads.insert(key.to_string());
        self
    }

    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains(key)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn put_attempts(&self, key: &str) -> u32 {
        self.put_attempts
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(self)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

struct InFlight<'a>(&'a MemoryStore);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &'static str {
        "depot-archive"
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let _guard = self.enter();
        self.simulate_latency().await;
        self.head_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_heads.contains(key) {
            return Err(StoreError::Head {
                bucket: self.bucket().to_string(),
                key: key.to_string(),
                source: "simulated head failure".into(),
            });
        }
        Ok(self.contains(key))
    }

    async fn put(&self, key: &str, local_path: &Path) -> Result<(), StoreError> {
        let _guard = self.enter();
        self.simulate_latency().await;
        *self
            .put_attempts
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default() += 1;

        if self.failing_puts.contains(key) {
            return Err(StoreError::Upload {
                bucket: self.bucket().to_string(),
                key: key.to_string(),
                source: "simulated transport failure".into(),
            });
        }
        if !local_path.is_file() {
            return Err(StoreError::Body {
                path: local_path.to_path_buf(),
                source: Box::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
            });
        }

        self.objects.lock().unwrap().insert(key.to_string());
        Ok(())
    }
}
