use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PvmError {
    #[error("Network error during {operation} ({stage}): {details}")]
    Network {
        operation: &'static str,
        stage: NetworkStage,
        details: String,
    },

    #[error("Failed to decode {what}: {details}")]
    Decode { what: &'static str, details: String },

    #[error("No release matches '{specifier}'")]
    NotFound { specifier: String },

    #[error("Version {version} is not installed")]
    NotInstalled { version: String },

    #[error("Cannot remove version {version}: currently in use")]
    InUse { version: String },

    #[error("Download failed for {url}: {details}")]
    Download { url: String, details: String },

    #[error("Extraction failed: {details}")]
    Extract { details: String },

    #[error("IO error while trying to {context}{}: {message}", display_path(.path))]
    Io {
        context: &'static str,
        path: PathBuf,
        kind: std::io::ErrorKind,
        message: String,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStage {
    #[error("request")]
    Request,
    #[error("status")]
    Status,
    #[error("response body")]
    ResponseBody,
}

fn display_path(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        String::new()
    } else {
        format!(" {}", path.display())
    }
}

impl PvmError {
    pub fn network_request<E>(operation: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::Network {
            operation,
            stage: NetworkStage::Request,
            details: error.to_string(),
        }
    }

    pub fn network_status(operation: &'static str, details: impl Into<String>) -> Self {
        Self::Network {
            operation,
            stage: NetworkStage::Status,
            details: details.into(),
        }
    }

    pub fn network_body<E>(operation: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::Network {
            operation,
            stage: NetworkStage::ResponseBody,
            details: error.to_string(),
        }
    }

    pub fn decode<E>(what: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::Decode {
            what,
            details: error.to_string(),
        }
    }

    pub fn download(url: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            details: details.into(),
        }
    }

    pub fn extract(details: impl Into<String>) -> Self {
        Self::Extract {
            details: details.into(),
        }
    }

    pub fn io_with_path(context: &'static str, path: &Path, error: &std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// True for failures the registry or download host produced, as opposed
    /// to local state.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Download { .. })
    }
}
