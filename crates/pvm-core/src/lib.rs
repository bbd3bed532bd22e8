//! Version management engine for pvm.
//!
//! This crate holds the logic behind every CLI command, independent of
//! terminal presentation:
//! - GitHub release listing and the latest-release lookup.
//! - The time-bounded release cache stored at `<root>/releases.cache`.
//! - Specifier resolution (`latest`, exact identifiers, dotted prefixes).
//! - Archive download and extraction into `<root>/versions/<version>`.
//! - Symlink-based activation through `<root>/bin`.
//!
//! Invocations are not coordinated with each other. Two processes running
//! `install`, `use` or `remove` against the same root race on the versions
//! and bin directories; nothing here takes an inter-process lock.

mod activate;
mod cache;
mod install;
mod registry;
mod resolver;

/// Symlink activation, current-version lookup, and safe removal.
pub use activate::Activation;
/// Release cache with injectable clock and source.
pub use cache::{CacheEntry, DEFAULT_TTL_HOURS, ReleaseCache};
/// Archive download and extraction.
pub use install::{DEFAULT_DOWNLOAD_BASE_URL, Installer};
/// GitHub releases client.
pub use registry::{DEFAULT_API_URL, GitHubRegistry};
/// Specifier resolution against the cached release set.
pub use resolver::{LATEST, VersionResolver, resolve_in};
