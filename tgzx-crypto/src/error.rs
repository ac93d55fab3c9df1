use std::path::PathBuf;
use thiserror::Error;

/// Result type for envelope and key operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors raised while parsing keys or sealing/opening envelopes.
///
/// Messages never contain key material.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("failed to encrypt: {0}")]
    EncryptFailed(String),

    /// Wrong key and corrupted envelope are deliberately indistinguishable.
    #[error("failed to decrypt: {0}")]
    DecryptFailed(String),

    #[error("invalid recipient key: {0}")]
    InvalidRecipient(String),

    #[error("failed to open identity file {}: {source}", path.display())]
    OpenIdentity {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse identity: {0}")]
    ParseIdentity(String),
}
