use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Name of the per-version directory segment; `current_version` parsing keys
/// off this segment.
pub const VERSIONS_DIR: &str = "versions";

#[cfg(target_os = "windows")]
pub const PRIMARY_BINARY: &str = "pulumi.exe";
#[cfg(not(target_os = "windows"))]
pub const PRIMARY_BINARY: &str = "pulumi";

const ROOT_DIR_NAME: &str = ".pvm";
const ROOT_ENV_VAR: &str = "PVM_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ToolPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
}

/// On-disk layout rooted at the tool directory (`~/.pvm` by default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub root: PathBuf,
}

impl ToolPaths {
    /// Resolve the tool root from `$PVM_DIR`, falling back to `~/.pvm`.
    ///
    /// # Errors
    /// Returns an error when `$PVM_DIR` is unset and the home directory
    /// cannot be determined.
    pub fn new() -> Result<Self, ToolPathsError> {
        if let Some(root) = std::env::var_os(ROOT_ENV_VAR).filter(|value| !value.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }

        let home = dirs::home_dir().ok_or(ToolPathsError::HomeDirUnavailable)?;
        Ok(Self::with_root(home.join(ROOT_DIR_NAME)))
    }

    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn versions_dir(&self) -> PathBuf {
        self.root.join(VERSIONS_DIR)
    }

    #[must_use]
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.versions_dir().join(version)
    }

    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    #[must_use]
    pub fn primary_binary(&self) -> PathBuf {
        self.bin_dir().join(PRIMARY_BINARY)
    }

    #[must_use]
    pub fn cache_file(&self) -> PathBuf {
        self.root.join("releases.cache")
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.root.join("pvm.log")
    }

    /// Whether `version` names exactly one entry directly under the versions
    /// directory. Empty strings, `.`/`..`, separators and trailing slashes are
    /// rejected.
    #[must_use]
    pub fn is_version_name(version: &str) -> bool {
        if version.contains(['/', '\\']) {
            return false;
        }
        let mut components = Path::new(version).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(name)), None) if name == version
        )
    }

    /// Extract the version identifier from a link target inside the versions
    /// directory, e.g. `~/.pvm/versions/3.78.1/pulumi` -> `3.78.1`.
    ///
    /// Targets under this root's versions directory are matched by prefix.
    /// Anything else falls back to the segment after the last `versions`
    /// component.
    #[must_use]
    pub fn version_from_target(&self, target: &Path) -> Option<String> {
        let versions_dir = self.versions_dir();
        let versions_dir = std::path::absolute(&versions_dir).unwrap_or(versions_dir);
        if let Ok(rest) = target.strip_prefix(&versions_dir) {
            return match rest.components().next() {
                Some(Component::Normal(name)) => name.to_str().map(str::to_string),
                _ => None,
            };
        }

        let segments: Vec<&OsStr> = target.components().map(|c| c.as_os_str()).collect();
        let index = segments.iter().rposition(|segment| *segment == VERSIONS_DIR)?;
        segments
            .get(index + 1)
            .and_then(|segment| segment.to_str())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{PRIMARY_BINARY, ToolPaths};

    #[test]
    fn file_paths_use_expected_filenames() {
        let paths = ToolPaths::with_root("/home/user/.pvm");

        assert_eq!(paths.cache_file(), Path::new("/home/user/.pvm/releases.cache"));
        assert_eq!(paths.settings_file(), Path::new("/home/user/.pvm/settings.json"));
        assert_eq!(paths.log_file(), Path::new("/home/user/.pvm/pvm.log"));
        assert_eq!(
            paths.version_dir("3.78.1"),
            Path::new("/home/user/.pvm/versions/3.78.1")
        );
        assert_eq!(
            paths.primary_binary(),
            Path::new("/home/user/.pvm/bin").join(PRIMARY_BINARY)
        );
    }

    #[test]
    fn version_from_target_takes_segment_after_versions_dir() {
        let paths = ToolPaths::with_root("/home/user/.pvm");
        let target = Path::new("/home/user/.pvm/versions/3.78.1/pulumi");

        assert_eq!(paths.version_from_target(target).as_deref(), Some("3.78.1"));
    }

    #[test]
    fn version_from_target_ignores_versions_segment_in_root() {
        let paths = ToolPaths::with_root("/data/versions/pvm");
        let target = Path::new("/data/versions/pvm/versions/3.78.1/pulumi");

        assert_eq!(paths.version_from_target(target).as_deref(), Some("3.78.1"));
    }

    #[test]
    fn version_from_target_handles_relative_and_foreign_paths() {
        let paths = ToolPaths::with_root("/home/user/.pvm");

        assert_eq!(
            paths.version_from_target(Path::new("../versions/3.80.0/pulumi")).as_deref(),
            Some("3.80.0")
        );
        let nested = Path::new("/srv/versions/old/versions/3.1.0/pulumi");
        assert_eq!(paths.version_from_target(nested).as_deref(), Some("3.1.0"));
        assert_eq!(paths.version_from_target(Path::new("/usr/local/bin/pulumi")), None);
        assert_eq!(paths.version_from_target(Path::new("/opt/versions")), None);
        assert_eq!(paths.version_from_target(Path::new("/home/user/.pvm/versions")), None);
    }

    #[test]
    fn version_names_are_single_plain_segments() {
        assert!(ToolPaths::is_version_name("3.78.1"));
        assert!(ToolPaths::is_version_name("3.78.1-alpha.1"));

        for bad in ["", ".", "..", "3.78.1/", "./3.78.1", "../escape", "a/b", "a\\b", "/abs"] {
            assert!(!ToolPaths::is_version_name(bad), "{bad:?} should be rejected");
        }
    }
}
