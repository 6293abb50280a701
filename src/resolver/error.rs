//! Resolution error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to callers of [`super::LastModified`].
///
/// Git problems never show up here; they degrade to the mtime fallback.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("`{}` does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid date format `{0}`")]
    InvalidFormat(String),

    #[error("timestamp {0} is out of range")]
    Timestamp(i64),
}

impl ResolveError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
