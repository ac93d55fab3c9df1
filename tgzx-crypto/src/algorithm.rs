use serde::Serialize;
use std::fmt;

/// Key algorithms that can seal or open an archive.
///
/// The set is closed: key-exchange-only or signature-only SSH key types
/// (ECDSA, security keys, DSA) have no representation here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    Rsa,
    Ed25519,
}

impl KeyAlgorithm {
    /// The SSH wire name, as it appears at the start of an authorized key line.
    pub const fn ssh_name(self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa => "ssh-rsa",
            KeyAlgorithm::Ed25519 => "ssh-ed25519",
        }
    }

    pub fn from_ssh_name(name: &str) -> Option<Self> {
        match name {
            "ssh-rsa" => Some(KeyAlgorithm::Rsa),
            "ssh-ed25519" => Some(KeyAlgorithm::Ed25519),
            _ => None,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ssh_name())
    }
}
