use thiserror::Error;

use crate::collection::SnapshotError;
use crate::config::ConfigError;

/// Crate-level error for callers that deal with both configuration and
/// fallible snapshot building.
#[derive(Debug, Error)]
pub enum HeraldError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
}

pub type Result<T, E = HeraldError> = std::result::Result<T, E>;
