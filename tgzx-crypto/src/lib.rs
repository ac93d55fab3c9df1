//! Envelope encryption layer for tgzx.
//!
//! Archives are sealed to SSH public keys using the age v1 format:
//!
//! 1. A fresh random **file key** is generated per archive.
//! 2. The file key is wrapped once per [`Recipient`], using the wrapping
//!    primitive of that recipient's key algorithm (RSA-OAEP for `ssh-rsa`,
//!    tweaked X25519 for `ssh-ed25519`).
//! 3. The payload is streamed through ChaCha20-Poly1305 in 64 KiB
//!    authenticated chunks, so memory use is independent of archive size.
//!
//! Decryption tries each [`Identity`] against the wrapped-key records until
//! one unwraps. Every payload chunk is authenticated before it is returned;
//! truncated or tampered envelopes fail with [`CryptoError::DecryptFailed`].

mod algorithm;
pub mod envelope;
mod error;
pub mod identity;
pub mod recipient;
#[cfg(feature = "test-keys")]
pub mod testing;

pub use algorithm::KeyAlgorithm;
pub use envelope::{decrypt, decrypt_to_vec, encrypt};
pub use error::{CryptoError, CryptoResult};
pub use identity::{load_identity, Identity};
pub use recipient::Recipient;
