use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use futures_util::StreamExt;
use log::{debug, info, warn};
use pvm_platform::{ArchiveKind, Platform, ToolPaths};
use pvm_types::PvmError;
use tokio::io::AsyncWriteExt;
use tokio_util::io::{StreamReader, SyncIoBridge};

pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://github.com/pulumi/pulumi/releases/download";

/// Downloads release archives and unpacks them into per-version directories.
pub struct Installer {
    client: reqwest::Client,
    paths: ToolPaths,
    platform: Platform,
    download_base_url: String,
}

impl Installer {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        paths: ToolPaths,
        download_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            paths,
            platform: Platform::current(),
            download_base_url: download_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn download_url(&self, version: &str) -> String {
        format!(
            "{base}/v{version}/pulumi-v{version}-{os}-{arch}.{ext}",
            base = self.download_base_url,
            os = self.platform.os,
            arch = self.platform.arch,
            ext = self.platform.archive_kind().extension(),
        )
    }

    /// Download `version` and extract it into its version directory.
    ///
    /// Installing over an existing directory overwrites its files. On any
    /// failure the version directory is removed before the error is returned.
    ///
    /// # Errors
    /// Returns a download error for transport or HTTP status failures, an
    /// extract error for malformed archives, or an IO error when the version
    /// directory cannot be written.
    pub async fn install(&self, version: &str) -> Result<PathBuf, PvmError> {
        if !ToolPaths::is_version_name(version) {
            return Err(PvmError::NotFound {
                specifier: version.to_string(),
            });
        }

        let dest = self.paths.version_dir(version);
        std::fs::create_dir_all(&dest)
            .map_err(|error| PvmError::io_with_path("create version directory", &dest, &error))?;

        let url = self.download_url(version);
        info!("Installing {version} from {url}");

        match self.download_and_extract(&url, &dest).await {
            Ok(files) => {
                info!("Extracted {files} files into {}", dest.display());
                Ok(dest)
            }
            Err(error) => {
                warn!("Install of {version} failed, removing {}: {error}", dest.display());
                if let Err(cleanup) = std::fs::remove_dir_all(&dest) {
                    warn!("Failed to remove {}: {cleanup}", dest.display());
                }
                Err(error)
            }
        }
    }

    async fn download_and_extract(&self, url: &str, dest: &Path) -> Result<usize, PvmError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| PvmError::download(url, error.to_string()))?;

        if !response.status().is_success() {
            return Err(PvmError::download(url, format!("HTTP {}", response.status())));
        }

        match self.platform.archive_kind() {
            ArchiveKind::TarGz => extract_streamed_tar_gz(response, dest).await,
            ArchiveKind::Zip => self.extract_staged_zip(response, url, dest).await,
        }
    }

    async fn extract_staged_zip(
        &self,
        response: reqwest::Response,
        url: &str,
        dest: &Path,
    ) -> Result<usize, PvmError> {
        let staging_dir = &self.paths.root;
        let staged = tempfile::Builder::new()
            .prefix(".download-")
            .suffix(".zip")
            .tempfile_in(staging_dir)
            .map_err(|error| PvmError::io_with_path("stage download", staging_dir, &error))?;
        let handle = staged
            .reopen()
            .map_err(|error| PvmError::io_with_path("stage download", staged.path(), &error))?;
        let mut file = tokio::fs::File::from_std(handle);

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|error| PvmError::download(url, error.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|error| PvmError::io_with_path("write download", staged.path(), &error))?;
            downloaded += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|error| PvmError::io_with_path("flush download", staged.path(), &error))?;
        drop(file);
        debug!("Downloaded {downloaded} bytes to {}", staged.path().display());

        let dest = dest.to_path_buf();
        // The staged file is deleted when `staged` drops at the end of the task.
        tokio::task::spawn_blocking(move || extract_zip(staged.path(), &dest))
            .await
            .map_err(|error| PvmError::extract(error.to_string()))?
    }
}

async fn extract_streamed_tar_gz(
    response: reqwest::Response,
    dest: &Path,
) -> Result<usize, PvmError> {
    let stream = response
        .bytes_stream()
        .map(|chunk| chunk.map_err(std::io::Error::other));
    let reader = SyncIoBridge::new(StreamReader::new(Box::pin(stream)));
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || extract_tar_gz(reader, &dest))
        .await
        .map_err(|error| PvmError::extract(error.to_string()))?
}

/// Re-root an archive entry under the destination by dropping the wrapper
/// directory. Returns `None` for the wrapper itself and for entries that
/// would escape the destination.
fn strip_wrapper(entry: &Path) -> Option<PathBuf> {
    let mut parts = Vec::new();
    for component in entry.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                warn!("Skipping archive entry with unsafe path: {}", entry.display());
                return None;
            }
        }
    }

    if parts.len() <= 1 {
        return None;
    }
    Some(parts[1..].iter().collect())
}

fn extract_tar_gz<R: Read>(reader: R, dest: &Path) -> Result<usize, PvmError> {
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(reader));
    let entries = archive
        .entries()
        .map_err(|error| PvmError::extract(format!("failed to read tar archive: {error}")))?;

    let mut files = 0;
    for entry in entries {
        let mut entry =
            entry.map_err(|error| PvmError::extract(format!("failed to read tar entry: {error}")))?;
        let entry_path = entry
            .path()
            .map_err(|error| PvmError::extract(format!("invalid tar entry path: {error}")))?
            .into_owned();
        let Some(relative) = strip_wrapper(&entry_path) else {
            continue;
        };
        let out_path = dest.join(relative);

        let entry_type = entry.header().entry_type();
        if entry_type.is_dir() {
            create_dir(&out_path)?;
        } else if entry_type.is_file() {
            write_executable(&mut entry, &out_path)?;
            files += 1;
        } else {
            debug!("Skipping tar entry {} of type {entry_type:?}", entry_path.display());
        }
    }

    Ok(files)
}

fn extract_zip(zip_path: &Path, dest: &Path) -> Result<usize, PvmError> {
    let file = File::open(zip_path)
        .map_err(|error| PvmError::io_with_path("open zip archive", zip_path, &error))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|error| PvmError::extract(format!("failed to read zip archive: {error}")))?;

    let mut files = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|error| PvmError::extract(format!("failed to read zip entry: {error}")))?;
        let Some(name) = entry.enclosed_name() else {
            warn!("Skipping zip entry with unsafe path");
            continue;
        };
        let Some(relative) = strip_wrapper(&name) else {
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            create_dir(&out_path)?;
        } else {
            write_executable(&mut entry, &out_path)?;
            files += 1;
        }
    }

    Ok(files)
}

fn create_dir(path: &Path) -> Result<(), PvmError> {
    std::fs::create_dir_all(path)
        .map_err(|error| PvmError::io_with_path("create extraction directory", path, &error))
}

fn write_executable(reader: &mut impl Read, out_path: &Path) -> Result<(), PvmError> {
    if let Some(parent) = out_path.parent() {
        create_dir(parent)?;
    }
    let mut outfile = File::create(out_path)
        .map_err(|error| PvmError::io_with_path("create extracted file", out_path, &error))?;
    std::io::copy(reader, &mut outfile).map_err(|error| {
        PvmError::extract(format!("failed to extract {}: {error}", out_path.display()))
    })?;
    set_executable(out_path)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<(), PvmError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|error| PvmError::io_with_path("set executable permissions", path, &error))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<(), PvmError> {
    Ok(())
}
