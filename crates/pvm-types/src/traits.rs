use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::PvmError;

/// Upstream source of released version identifiers.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Every released identifier, tag prefixes already stripped.
    ///
    /// Implementations return either the complete list or an error, never a
    /// truncated list.
    async fn fetch_releases(&self) -> Result<Vec<String>, PvmError>;

    /// The identifier the registry flags as its latest release.
    async fn fetch_latest(&self) -> Result<String, PvmError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
