use log::debug;
use pvm_types::{PvmError, highest_matching};

use crate::cache::ReleaseCache;

pub const LATEST: &str = "latest";

/// Maps a user-supplied specifier to one concrete release.
pub struct VersionResolver {
    cache: ReleaseCache,
}

impl VersionResolver {
    #[must_use]
    pub fn new(cache: ReleaseCache) -> Self {
        Self { cache }
    }

    #[must_use]
    pub fn cache(&self) -> &ReleaseCache {
        &self.cache
    }

    /// Resolve `latest`, an exact identifier, or a dotted prefix.
    ///
    /// `latest` asks the registry's latest-release endpoint directly and
    /// never falls back to the cached list.
    ///
    /// # Errors
    /// Returns [`PvmError::NotFound`] when nothing matches, or the registry
    /// error when the release set cannot be obtained.
    pub async fn resolve(&self, specifier: &str) -> Result<String, PvmError> {
        let specifier = normalize_specifier(specifier);

        if specifier == LATEST {
            return self.cache.source().fetch_latest().await;
        }

        let versions = self.cache.get_releases(false).await?;
        let resolved = resolve_in(specifier, &versions)?;
        debug!("Resolved '{specifier}' to {resolved}");
        Ok(resolved)
    }
}

/// Resolve a non-`latest` specifier against a known release set.
///
/// # Errors
/// Returns [`PvmError::NotFound`] naming the specifier when it matches no
/// member of `versions`.
pub fn resolve_in(specifier: &str, versions: &[String]) -> Result<String, PvmError> {
    if versions.iter().any(|version| version == specifier) {
        return Ok(specifier.to_string());
    }

    highest_matching(versions, specifier)
        .map(str::to_string)
        .ok_or_else(|| PvmError::NotFound {
            specifier: specifier.to_string(),
        })
}

/// Accept tag-style input such as `v3.78.1`.
fn normalize_specifier(specifier: &str) -> &str {
    let specifier = specifier.trim();
    match specifier.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => specifier,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use pvm_types::{PvmError, ReleaseSource, SystemClock};

    use super::{VersionResolver, resolve_in};
    use crate::cache::ReleaseCache;

    fn owned(versions: &[&str]) -> Vec<String> {
        versions.iter().map(ToString::to_string).collect()
    }

    struct FakeRegistry {
        versions: Vec<String>,
        latest: Result<String, PvmError>,
        list_calls: AtomicUsize,
    }

    #[async_trait]
    impl ReleaseSource for FakeRegistry {
        async fn fetch_releases(&self) -> Result<Vec<String>, PvmError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.versions.clone())
        }

        async fn fetch_latest(&self) -> Result<String, PvmError> {
            self.latest.clone()
        }
    }

    fn resolver(
        temp: &tempfile::TempDir,
        versions: &[&str],
        latest: Result<String, PvmError>,
    ) -> (VersionResolver, Arc<FakeRegistry>) {
        let registry = Arc::new(FakeRegistry {
            versions: owned(versions),
            latest,
            list_calls: AtomicUsize::new(0),
        });
        let cache = ReleaseCache::new(
            temp.path().join("releases.cache"),
            registry.clone(),
            Arc::new(SystemClock),
        );
        (VersionResolver::new(cache), registry)
    }

    #[test]
    fn resolve_exact_match_takes_precedence() {
        let versions = owned(&["3.78", "3.78.1", "3.78.0"]);
        assert_eq!(
            resolve_in("3.78", &versions).expect("exact identifier should resolve"),
            "3.78"
        );
    }

    #[test]
    fn resolve_prefix_picks_highest_match() {
        let versions = owned(&["3.78.0", "3.78.1", "3.80.0"]);
        assert_eq!(
            resolve_in("3.78", &versions).expect("prefix should resolve"),
            "3.78.1"
        );
        assert_eq!(
            resolve_in("3", &versions).expect("major prefix should resolve"),
            "3.80.0"
        );
    }

    #[test]
    fn resolve_without_match_names_specifier() {
        let versions = owned(&["3.78.0", "3.78.1"]);
        let error = resolve_in("3.7", &versions).expect_err("3.7 should not match 3.78.x");
        assert_eq!(
            error,
            PvmError::NotFound {
                specifier: "3.7".to_string()
            }
        );
    }

    #[tokio::test]
    async fn resolve_latest_bypasses_release_list() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let (resolver, registry) = resolver(&temp, &["3.78.1"], Ok("3.142.0".to_string()));

        let resolved = resolver.resolve("latest").await.expect("latest should resolve");

        assert_eq!(resolved, "3.142.0");
        assert_eq!(registry.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolve_latest_failure_does_not_fall_back() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let failure = PvmError::network_status("fetch latest release", "HTTP 500");
        let (resolver, registry) = resolver(&temp, &["3.78.1"], Err(failure.clone()));

        let error = resolver.resolve("latest").await.expect_err("latest should fail");

        assert_eq!(error, failure);
        assert_eq!(registry.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolve_accepts_tag_style_specifier() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let (resolver, _) = resolver(&temp, &["3.78.0", "3.78.1"], Ok("3.78.1".to_string()));

        assert_eq!(
            resolver.resolve(" v3.78 ").await.expect("tag prefix should resolve"),
            "3.78.1"
        );
    }

    #[tokio::test]
    async fn resolve_reads_release_set_through_cache() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let (resolver, registry) = resolver(&temp, &["3.78.0", "3.78.1"], Ok("3.78.1".to_string()));

        resolver.resolve("3.78.0").await.expect("exact should resolve");
        resolver.resolve("3.78").await.expect("prefix should resolve");

        assert_eq!(registry.list_calls.load(Ordering::SeqCst), 1);
        assert!(resolver.cache().path().exists());
    }
}
