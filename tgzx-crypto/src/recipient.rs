//! Public keys an archive can be sealed to.

use crate::algorithm::KeyAlgorithm;
use crate::error::{CryptoError, CryptoResult};
use age::ssh;
use std::fmt;
use std::str::FromStr;

/// A public key that receives one wrapped copy of an archive's file key.
///
/// Parsed from a single authorized-key line (`<type> <base64> [comment]`).
/// Each variant wraps with its own algorithm; there is no open-ended
/// recipient type.
pub enum Recipient {
    Rsa(ssh::Recipient),
    Ed25519(ssh::Recipient),
}

impl Recipient {
    /// Parses one authorized-key line.
    ///
    /// The key type token selects the variant. Unsupported key types and
    /// malformed key material are reported as [`CryptoError::InvalidRecipient`].
    pub fn parse(line: &str) -> CryptoResult<Self> {
        let mut fields = line.split_whitespace();
        let kind = fields
            .next()
            .ok_or_else(|| CryptoError::InvalidRecipient("empty key line".to_string()))?;
        let algorithm = KeyAlgorithm::from_ssh_name(kind)
            .ok_or_else(|| CryptoError::InvalidRecipient(format!("unsupported key type {kind}")))?;
        let material = fields.next().ok_or_else(|| {
            CryptoError::InvalidRecipient(format!("{kind} key has no key material"))
        })?;

        // The comment is dropped; only type and key blob are handed to the parser.
        let key: ssh::Recipient = format!("{kind} {material}")
            .parse()
            .map_err(|e| CryptoError::InvalidRecipient(format!("{kind} key rejected: {e:?}")))?;

        Ok(match algorithm {
            KeyAlgorithm::Rsa => Recipient::Rsa(key),
            KeyAlgorithm::Ed25519 => Recipient::Ed25519(key),
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Recipient::Rsa(_) => KeyAlgorithm::Rsa,
            Recipient::Ed25519(_) => KeyAlgorithm::Ed25519,
        }
    }

    /// The wrapping primitive for this recipient's algorithm.
    pub(crate) fn wrapper(&self) -> &dyn age::Recipient {
        match self {
            Recipient::Rsa(key) => key,
            Recipient::Ed25519(key) => key,
        }
    }
}

impl FromStr for Recipient {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Recipient::parse(s)
    }
}

impl fmt::Debug for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Recipient").field(&self.algorithm()).finish()
    }
}
