use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};
use pvm_types::{Clock, PvmError, ReleaseSource, sort_descending};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TTL_HOURS: i64 = 24;

/// The persisted release set. Self-describing: the timestamp travels with
/// the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub versions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    fn load_from_path(path: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(entry) => Some(entry),
            Err(error) => {
                debug!("Ignoring unreadable release cache {}: {error}", path.display());
                None
            }
        }
    }

    fn save_to_path(&self, path: &Path) -> Result<(), PvmError> {
        let data =
            serde_json::to_vec(self).map_err(|error| PvmError::decode("release cache", error))?;
        write_atomic(path, &data)
    }

    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.timestamp <= ttl
    }
}

/// Time-bounded local cache in front of a [`ReleaseSource`].
pub struct ReleaseCache {
    path: PathBuf,
    ttl: TimeDelta,
    source: Arc<dyn ReleaseSource>,
    clock: Arc<dyn Clock>,
}

impl ReleaseCache {
    #[must_use]
    pub fn new(path: PathBuf, source: Arc<dyn ReleaseSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path,
            ttl: TimeDelta::hours(DEFAULT_TTL_HOURS),
            source,
            clock,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn source(&self) -> &Arc<dyn ReleaseSource> {
        &self.source
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Known releases, highest first.
    ///
    /// A fresh cache entry is served without touching the network unless
    /// `force_refresh` is set. Failing to persist a refreshed list is logged
    /// as a warning and the list is still returned.
    ///
    /// # Errors
    /// Returns the registry error when a refresh is required and fails.
    pub async fn get_releases(&self, force_refresh: bool) -> Result<Vec<String>, PvmError> {
        if !force_refresh {
            match CacheEntry::load_from_path(&self.path) {
                Some(entry) if entry.is_fresh(self.clock.now(), self.ttl) => {
                    debug!(
                        "Serving {} releases from cache written at {}",
                        entry.versions.len(),
                        entry.timestamp
                    );
                    return Ok(entry.versions);
                }
                Some(entry) => info!("Release cache from {} has expired", entry.timestamp),
                None => debug!("No usable release cache at {}", self.path.display()),
            }
        }

        let mut versions = self.source.fetch_releases().await?;
        sort_descending(&mut versions);

        let entry = CacheEntry {
            versions,
            timestamp: self.clock.now(),
        };
        if let Err(error) = entry.save_to_path(&self.path) {
            warn!("Failed to save release cache: {error}");
        }

        Ok(entry.versions)
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), PvmError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .map_err(|error| PvmError::io_with_path("create cache directory", parent, &error))?;

    let mut staged = tempfile::NamedTempFile::new_in(parent)
        .map_err(|error| PvmError::io_with_path("stage release cache", parent, &error))?;
    staged
        .write_all(data)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|error| PvmError::io_with_path("write release cache", staged.path(), &error))?;
    staged
        .persist(path)
        .map_err(|error| PvmError::io_with_path("replace release cache", path, &error.error))?;
    Ok(())
}
