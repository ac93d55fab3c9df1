use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to create archive: {}: {source}", path.display())]
    CreateArchiveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the tar trailer or gzip footer failed.
    #[error("failed to create archive: finishing stream: {0}")]
    Finish(#[source] io::Error),

    #[error("failed to extract: {0}")]
    ExtractFailed(String),

    #[error("failed to extract: path traversal: {entry}")]
    PathTraversal { entry: String },
}
