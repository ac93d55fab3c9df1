//! Core error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to fetch keys for {identifier}: {reason}")]
    FetchFailed { identifier: String, reason: String },

    #[error("no valid keys found for {identifier}")]
    NoValidKeys { identifier: String },

    #[error("failed to open {}: {source}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("operation cancelled")]
    Cancelled,

    /// A pipeline stage panicked or could not be joined.
    #[error("pipeline task failed: {0}")]
    Task(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Archive(#[from] tgzx_archive::ArchiveError),

    #[error(transparent)]
    Crypto(#[from] tgzx_crypto::CryptoError),
}
