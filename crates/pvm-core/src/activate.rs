use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info};
use pvm_platform::ToolPaths;
use pvm_types::{PvmError, sort_descending};

/// Selects which installed version the shared bin directory points at.
///
/// The active version is never stored; it is derived from the primary
/// binary's symlink target on every read.
#[derive(Debug, Clone)]
pub struct Activation {
    paths: ToolPaths,
}

impl Activation {
    #[must_use]
    pub fn new(paths: ToolPaths) -> Self {
        Self { paths }
    }

    #[must_use]
    pub fn is_installed(&self, version: &str) -> bool {
        ToolPaths::is_version_name(version) && self.paths.version_dir(version).is_dir()
    }

    /// Installed versions, highest first. A missing versions directory
    /// yields an empty list.
    ///
    /// # Errors
    /// Returns an IO error when the versions directory exists but cannot be
    /// read.
    pub fn installed_versions(&self) -> Result<Vec<String>, PvmError> {
        let versions_dir = self.paths.versions_dir();
        let entries = match std::fs::read_dir(&versions_dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(PvmError::io_with_path(
                    "list installed versions",
                    &versions_dir,
                    &error,
                ));
            }
        };

        let mut versions: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        sort_descending(&mut versions);
        Ok(versions)
    }

    /// Point the bin directory at `version`.
    ///
    /// Every symlink in the bin directory is removed first, then one link is
    /// created per file in the version directory. Regular files in the bin
    /// directory are left alone.
    ///
    /// # Errors
    /// Returns [`PvmError::NotInstalled`] when the version directory is
    /// missing, or an IO error when links cannot be replaced.
    pub fn activate(&self, version: &str) -> Result<(), PvmError> {
        if !self.is_installed(version) {
            return Err(not_installed(version));
        }
        let version_dir = self.paths.version_dir(version);

        let bin_dir = self.paths.bin_dir();
        std::fs::create_dir_all(&bin_dir)
            .map_err(|error| PvmError::io_with_path("create bin directory", &bin_dir, &error))?;

        let removed = remove_symlinks(&bin_dir)?;
        debug!("Removed {removed} existing links from {}", bin_dir.display());

        let version_dir = std::path::absolute(&version_dir).map_err(|error| {
            PvmError::io_with_path("resolve version directory", &version_dir, &error)
        })?;
        let read_error = |error: std::io::Error| {
            PvmError::io_with_path("read version directory", &version_dir, &error)
        };
        let entries = std::fs::read_dir(&version_dir).map_err(read_error)?;

        let mut linked = 0;
        for entry in entries {
            let entry = entry.map_err(read_error)?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|error| PvmError::io_with_path("inspect version entry", &path, &error))?;
            if file_type.is_dir() {
                continue;
            }

            let link = bin_dir.join(entry.file_name());
            create_symlink(&path, &link)
                .map_err(|error| PvmError::io_with_path("create symlink", &link, &error))?;
            linked += 1;
        }

        info!("Activated {version} with {linked} links in {}", bin_dir.display());
        Ok(())
    }

    /// The version the primary binary currently links into, if any.
    ///
    /// # Errors
    /// Returns an IO error when the link exists but cannot be read.
    pub fn current_version(&self) -> Result<Option<String>, PvmError> {
        let primary = self.paths.primary_binary();
        match std::fs::read_link(&primary) {
            Ok(target) => Ok(self.paths.version_from_target(&target)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(PvmError::io_with_path(
                "read current version link",
                &primary,
                &error,
            )),
        }
    }

    /// Delete an installed version that is not currently active.
    ///
    /// # Errors
    /// Returns [`PvmError::InUse`] for the active version,
    /// [`PvmError::NotInstalled`] when there is nothing to remove, or an IO
    /// error when the directory cannot be deleted.
    pub fn remove(&self, version: &str) -> Result<(), PvmError> {
        if !ToolPaths::is_version_name(version) {
            return Err(not_installed(version));
        }
        if self.current_version()?.as_deref() == Some(version) {
            return Err(PvmError::InUse {
                version: version.to_string(),
            });
        }

        let version_dir = self.paths.version_dir(version);
        if !version_dir.is_dir() {
            return Err(not_installed(version));
        }

        std::fs::remove_dir_all(&version_dir).map_err(|error| {
            PvmError::io_with_path("remove version directory", &version_dir, &error)
        })?;
        info!("Removed {}", version_dir.display());
        Ok(())
    }
}

fn not_installed(version: &str) -> PvmError {
    PvmError::NotInstalled {
        version: version.to_string(),
    }
}

fn remove_symlinks(bin_dir: &Path) -> Result<usize, PvmError> {
    let entries = std::fs::read_dir(bin_dir)
        .map_err(|error| PvmError::io_with_path("read bin directory", bin_dir, &error))?;

    let mut removed = 0;
    for entry in entries {
        let path = entry
            .map_err(|error| PvmError::io_with_path("read bin directory", bin_dir, &error))?
            .path();
        let is_symlink = std::fs::symlink_metadata(&path)
            .map_err(|error| PvmError::io_with_path("inspect bin entry", &path, &error))?
            .file_type()
            .is_symlink();
        if !is_symlink {
            continue;
        }
        std::fs::remove_file(&path)
            .map_err(|error| PvmError::io_with_path("remove stale link", &path, &error))?;
        removed += 1;
    }

    Ok(removed)
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
