//! Shared data model for pvm.
//!
//! - Version identifier ordering and prefix matching.
//! - The error taxonomy surfaced by every engine operation.
//! - Capability traits injected into the engine (`ReleaseSource`, `Clock`).

mod error;
mod traits;
mod version;

pub use error::{NetworkStage, PvmError};
pub use traits::{Clock, ReleaseSource, SystemClock};
pub use version::{
    compare_versions, highest_matching, matches_prefix, sort_descending, strip_tag_prefix,
};
