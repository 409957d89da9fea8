//! Error taxonomy for the topic filesystem.
//!
//! Not-found variants are normal negative results, not faults. Invariant
//! violations (`DirectoryNotEmpty`, `IsDirectory`, `Unsupported`) are
//! distinct so callers can branch on them. Protocol faults
//! (`InvalidChannel`, `MissingConfirmation`) mean the remote behaved
//! unexpectedly and are never retried.

use thiserror::Error;

/// Result alias used across the crate.
pub type FsResult<T> = Result<T, FsError>;

/// Remote status code for flood control ("too many requests").
///
/// The gateway retries calls failing with this code; every other remote
/// status surfaces immediately.
pub const STATUS_FLOOD_WAIT: i32 = 420;

/// A failed remote call, carrying the remote's numeric status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote call failed with status {code}: {message}")]
pub struct RemoteError {
    pub code: i32,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A flood-wait error, as the remote signals it.
    pub fn throttled(message: impl Into<String>) -> Self {
        Self::new(STATUS_FLOOD_WAIT, message)
    }

    pub fn is_throttled(&self) -> bool {
        self.code == STATUS_FLOOD_WAIT
    }
}

/// Errors surfaced by the filesystem facade and its components.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("directory not found")]
    DirectoryNotFound,

    #[error("object not found")]
    ObjectNotFound,

    #[error("the path names a directory, not an object")]
    IsDirectory,

    #[error("directory is not empty")]
    DirectoryNotEmpty,

    #[error("listing aborted")]
    ListAborted,

    #[error("the operation is not supported by the filesystem")]
    Unsupported,

    #[error("the channel is invalid or missing, check the configuration and join status")]
    InvalidChannel,

    #[error("the operation completed without the expected confirmation update")]
    MissingConfirmation,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl FsError {
    /// Whether this error is a plain negative lookup result.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::DirectoryNotFound | FsError::ObjectNotFound)
    }
}
