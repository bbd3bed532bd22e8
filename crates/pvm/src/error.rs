use pvm_platform::ToolPathsError;
use pvm_types::PvmError;
use thiserror::Error;

/// A command failure with the context the user needs to act on it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to {operation} {version}: {source}")]
    VersionOperation {
        operation: &'static str,
        version: String,
        #[source]
        source: PvmError,
    },

    #[error("failed to {operation}: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: PvmError,
    },

    #[error("failed to locate the pvm directory: {0}")]
    Paths(#[from] ToolPathsError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl AppError {
    pub fn for_version(operation: &'static str, version: &str, source: PvmError) -> Self {
        Self::VersionOperation {
            operation,
            version: version.to_string(),
            source,
        }
    }

    pub fn operation(operation: &'static str, source: PvmError) -> Self {
        Self::Operation { operation, source }
    }
}
