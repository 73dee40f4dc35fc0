//! Load failure taxonomy.

use std::path::PathBuf;

use thiserror::Error;

/// Why a load request was rejected or failed.
///
/// Input rejections (`FileNotFound`, `UnsupportedFormat`, `FileTooLarge`,
/// `Inaccessible`) are reported synchronously at submission and never
/// retried. `DecodeFailed` is reported as an event and retried up to the
/// task's retry budget before being reported as permanently failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("file does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("unsupported image format: {0:?}")]
    UnsupportedFormat(String),

    #[error("file too large: {size_bytes} bytes (limit {limit_bytes})")]
    FileTooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("cannot access file: {0}")]
    Inaccessible(String),

    #[error("failed to decode image: {0}")]
    DecodeFailed(String),
}

impl LoadError {
    /// Whether a retry might succeed. Only transient decode failures
    /// qualify; input rejections are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoadError::DecodeFailed(_))
    }
}
