//! Error types for lock-file checking.
//!
//! Every failure mode is attributable to one boundary: the lock file on disk,
//! the exclusion config beside it, the advisory crawler, or the crawler's
//! report contract. Nothing is retried or silently downgraded; a malformed
//! exclusion config in particular is a hard error, never "no exclusions".

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The lock file could not be resolved to an existing file.
    #[error("lock file does not exist: {0}")]
    LockFileNotFound(PathBuf),

    /// The exclusion config exists but is not valid, or its `exclusions`
    /// field is not a sequence of strings.
    #[error("invalid exclusion config {path}: {reason}")]
    ConfigFormat { path: PathBuf, reason: String },

    /// The crawler's report violates its contract (missing or malformed
    /// fields, or a count that disagrees with the entries). Indicates a
    /// boundary bug, not a recoverable condition.
    #[error("advisory report violates its contract: {0}")]
    DataIntegrity(String),

    /// The advisory lookup itself failed (network, server error).
    #[error("advisory lookup failed")]
    Crawler(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
