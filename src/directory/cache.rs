use std::{path::PathBuf, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::directory::{DirectoryBuilder, Error, StopDirectory, StopRecord};

/// Bumped whenever the persisted layout changes. A mismatching envelope is
/// treated as absent, never partially trusted.
pub const CACHE_FORMAT_VERSION: u32 = 2;

const DEFAULT_TTL_HOURS: i64 = 24;

/// Injected time source so expiry and rebuild logic stay deterministic
/// under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    format_version: u32,
    built_at: DateTime<Utc>,
    stops: Vec<StopRecord>,
}

#[derive(Default)]
struct Inner {
    snapshot: Option<Arc<StopDirectory>>,
    built_at: Option<DateTime<Utc>>,
    disk_checked: bool,
}

/// Disk-backed, time-expiring cache around [`DirectoryBuilder`]. Hands out
/// immutable snapshots; a refresh swaps the whole snapshot, readers never
/// touch the file themselves.
pub struct DirectoryCache {
    builder: DirectoryBuilder,
    cache_file: PathBuf,
    ttl: Duration,
    clock: Box<dyn Clock>,
    inner: Mutex<Inner>,
    /// Single-flight guard: late callers wait here for the in-flight
    /// rebuild instead of starting their own.
    rebuild_gate: Mutex<()>,
}

impl DirectoryCache {
    pub fn new(builder: DirectoryBuilder, cache_file: PathBuf) -> Self {
        Self {
            builder,
            cache_file,
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
            clock: Box::new(SystemClock),
            inner: Mutex::new(Inner::default()),
            rebuild_gate: Mutex::new(()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns a directory snapshot no older than the expiry window,
    /// rebuilding it first when needed. Concurrent callers share one
    /// rebuild. When a rebuild fails but an older snapshot exists, the
    /// older snapshot is returned instead of the error.
    pub async fn ensure_fresh(&self) -> Result<Arc<StopDirectory>, Error> {
        if let Some(directory) = self.fresh_snapshot().await {
            return Ok(directory);
        }

        let _gate = self.rebuild_gate.lock().await;
        // Another caller may have finished the rebuild while we waited.
        if let Some(directory) = self.fresh_snapshot().await {
            return Ok(directory);
        }

        self.load_from_disk_once().await;
        if let Some(directory) = self.fresh_snapshot().await {
            return Ok(directory);
        }

        match self.builder.build() {
            Ok(directory) => {
                let directory = Arc::new(directory);
                let built_at = self.clock.now();
                self.persist(&directory, built_at).await;
                let mut inner = self.inner.lock().await;
                inner.snapshot = Some(directory.clone());
                inner.built_at = Some(built_at);
                Ok(directory)
            }
            Err(err) => {
                let inner = self.inner.lock().await;
                if let Some(stale) = &inner.snapshot {
                    warn!("Directory rebuild failed, serving previous snapshot: {err}");
                    Ok(stale.clone())
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn fresh_snapshot(&self) -> Option<Arc<StopDirectory>> {
        let inner = self.inner.lock().await;
        let built_at = inner.built_at?;
        if self.clock.now() - built_at <= self.ttl {
            inner.snapshot.clone()
        } else {
            None
        }
    }

    /// The persisted envelope is read lazily, exactly once per process.
    async fn load_from_disk_once(&self) {
        let mut inner = self.inner.lock().await;
        if inner.disk_checked {
            return;
        }
        inner.disk_checked = true;

        let content = match tokio::fs::read_to_string(&self.cache_file).await {
            Ok(content) => content,
            Err(err) => {
                debug!("No usable cache file at {:?}: {err}", self.cache_file);
                return;
            }
        };
        let envelope: Envelope = match serde_json::from_str(&content) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!("Failed to parse cache file {:?}: {err}", self.cache_file);
                return;
            }
        };
        if envelope.format_version != CACHE_FORMAT_VERSION {
            info!(
                "Cache format version mismatch (cached: {}, current: {}), rebuilding",
                envelope.format_version, CACHE_FORMAT_VERSION
            );
            return;
        }

        let directory = StopDirectory::from_records(envelope.stops);
        info!(
            "Loaded {} stops from cache (built at {})",
            directory.len(),
            envelope.built_at
        );
        inner.snapshot = Some(Arc::new(directory));
        inner.built_at = Some(envelope.built_at);
    }

    /// Write-through after a rebuild. A persistence failure costs nothing
    /// but the next process start; the in-memory snapshot stays usable.
    async fn persist(&self, directory: &StopDirectory, built_at: DateTime<Utc>) {
        let envelope = Envelope {
            format_version: CACHE_FORMAT_VERSION,
            built_at,
            stops: directory.stops().to_vec(),
        };
        let content = match serde_json::to_string(&envelope) {
            Ok(content) => content,
            Err(err) => {
                warn!("Failed to serialize cache envelope: {err}");
                return;
            }
        };
        if let Some(parent) = self.cache_file.parent()
            && let Err(err) = tokio::fs::create_dir_all(parent).await
        {
            warn!("Failed to create cache directory {parent:?}: {err}");
            return;
        }
        match tokio::fs::write(&self.cache_file, content).await {
            Ok(()) => debug!("Saved stop directory cache to {:?}", self.cache_file),
            Err(err) => warn!("Failed to save cache file {:?}: {err}", self.cache_file),
        }
    }
}
