//! Sealing and opening the encrypted envelope.
//!
//! The envelope is an age v1 file: a text header with one stanza per
//! recipient, a header MAC, then the STREAM-encrypted payload. Any two
//! age implementations can read each other's envelopes.

use crate::error::{CryptoError, CryptoResult};
use crate::identity::Identity;
use crate::recipient::Recipient;
use age::stream::StreamReader;
use std::io::{self, Read, Write};
use tracing::debug;

/// Encrypts everything readable from `plaintext` into `output`.
///
/// A fresh file key is generated per call and wrapped once for each
/// recipient. Returns `output` after the final chunk has been written.
pub fn encrypt<R: Read, W: Write>(
    mut plaintext: R,
    output: W,
    recipients: &[Recipient],
) -> CryptoResult<W> {
    if recipients.is_empty() {
        return Err(CryptoError::EncryptFailed("no recipients".to_string()));
    }

    let encryptor = age::Encryptor::with_recipients(recipients.iter().map(Recipient::wrapper))
        .map_err(|e| CryptoError::EncryptFailed(e.to_string()))?;
    let mut writer = encryptor
        .wrap_output(output)
        .map_err(|e| CryptoError::EncryptFailed(format!("writing header: {e}")))?;

    let copied = io::copy(&mut plaintext, &mut writer)
        .map_err(|e| CryptoError::EncryptFailed(format!("streaming payload: {e}")))?;
    let output = writer
        .finish()
        .map_err(|e| CryptoError::EncryptFailed(format!("writing final chunk: {e}")))?;

    debug!(
        recipients = recipients.len(),
        bytes = copied,
        "sealed envelope"
    );
    Ok(output)
}

/// Opens an envelope, returning a reader over the authenticated plaintext.
///
/// Identities are tried in the order given; each is offered every
/// wrapped-key record before the next identity is tried. Chunk
/// authentication failures surface as I/O errors from the returned reader.
pub fn decrypt<R: Read>(input: R, identities: &[Identity]) -> CryptoResult<StreamReader<R>> {
    if identities.is_empty() {
        return Err(CryptoError::DecryptFailed("no identities".to_string()));
    }

    let decryptor =
        age::Decryptor::new(input).map_err(|e| CryptoError::DecryptFailed(e.to_string()))?;
    decryptor
        .decrypt(identities.iter().map(Identity::unwrapper))
        .map_err(|e| CryptoError::DecryptFailed(e.to_string()))
}

/// Opens an envelope and reads the whole plaintext into memory.
///
/// Nothing is returned unless every chunk authenticated, so callers never
/// see a truncated or tampered prefix.
pub fn decrypt_to_vec<R: Read>(input: R, identities: &[Identity]) -> CryptoResult<Vec<u8>> {
    let mut reader = decrypt(input, identities)?;
    let mut plaintext = Vec::new();
    reader
        .read_to_end(&mut plaintext)
        .map_err(|e| CryptoError::DecryptFailed(format!("reading payload: {e}")))?;
    Ok(plaintext)
}
