mod paths;
mod platform;

pub use paths::{PRIMARY_BINARY, ToolPaths, ToolPathsError, VERSIONS_DIR};
pub use platform::{ArchiveKind, Platform};
