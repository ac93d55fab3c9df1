use pretty_assertions::assert_eq;
use std::io::Read;
use tgzx_crypto::testing::{ed25519_key, rsa_key, TestKey};
use tgzx_crypto::{decrypt, decrypt_to_vec, encrypt, CryptoError, Identity, Recipient};

fn recipient(key: &TestKey) -> Recipient {
    Recipient::parse(&key.public_line).unwrap()
}

fn identity(key: &TestKey) -> Identity {
    Identity::from_pem(key.private_pem.as_bytes(), None).unwrap()
}

fn seal(plaintext: &[u8], keys: &[&TestKey]) -> Vec<u8> {
    let recipients: Vec<Recipient> = keys.iter().map(|k| recipient(k)).collect();
    encrypt(plaintext, Vec::new(), &recipients).unwrap()
}

// ── Round trips ──

#[test]
fn ed25519_roundtrip() {
    let key = ed25519_key();
    let sealed = seal(b"data", &[&key]);

    let opened = decrypt_to_vec(sealed.as_slice(), &[identity(&key)]).unwrap();
    assert_eq!(opened, b"data");
}

#[test]
fn rsa_roundtrip() {
    let key = rsa_key();
    let sealed = seal(b"rsa sealed payload", &[&key]);

    let opened = decrypt_to_vec(sealed.as_slice(), &[identity(&key)]).unwrap();
    assert_eq!(opened, b"rsa sealed payload");
}

#[test]
fn empty_payload_roundtrip() {
    let key = ed25519_key();
    let sealed = seal(b"", &[&key]);

    let opened = decrypt_to_vec(sealed.as_slice(), &[identity(&key)]).unwrap();
    assert!(opened.is_empty());
}

#[test]
fn multi_chunk_payload_roundtrip() {
    let key = ed25519_key();
    // Several 64 KiB chunks plus a partial tail.
    let plaintext: Vec<u8> = (0..(3 * 65536 + 1234)).map(|i| (i % 251) as u8).collect();
    let sealed = seal(&plaintext, &[&key]);

    let mut reader = decrypt(sealed.as_slice(), &[identity(&key)]).unwrap();
    let mut opened = Vec::new();
    reader.read_to_end(&mut opened).unwrap();
    assert_eq!(opened, plaintext);
}

#[test]
fn fresh_file_key_per_call() {
    let key = ed25519_key();
    let a = seal(b"same plaintext", &[&key]);
    let b = seal(b"same plaintext", &[&key]);
    assert_ne!(a, b);
}

#[test]
fn envelope_starts_with_age_header() {
    let key = ed25519_key();
    let sealed = seal(b"x", &[&key]);
    assert!(sealed.starts_with(b"age-encryption.org/v1\n"));
    let header = String::from_utf8_lossy(&sealed[..sealed.len().min(200)]).into_owned();
    assert!(header.contains("-> ssh-ed25519 "));
}

// ── Key independence ──

#[test]
fn each_recipient_decrypts_independently() {
    let a = ed25519_key();
    let b = rsa_key();
    let sealed = seal(b"shared secret", &[&a, &b]);

    assert_eq!(decrypt_to_vec(sealed.as_slice(), &[identity(&a)]).unwrap(), b"shared secret");
    assert_eq!(decrypt_to_vec(sealed.as_slice(), &[identity(&b)]).unwrap(), b"shared secret");
}

#[test]
fn outsider_identity_fails() {
    let a = ed25519_key();
    let b = ed25519_key();
    let outsider = ed25519_key();
    let sealed = seal(b"shared secret", &[&a, &b]);

    let err = decrypt_to_vec(sealed.as_slice(), &[identity(&outsider)]).unwrap_err();
    assert!(matches!(err, CryptoError::DecryptFailed(_)), "got: {err:?}");
}

#[test]
fn later_identity_matches_after_misses() {
    let a = ed25519_key();
    let outsider = ed25519_key();
    let sealed = seal(b"payload", &[&a]);

    let identities = [identity(&outsider), identity(&a)];
    assert_eq!(decrypt_to_vec(sealed.as_slice(), &identities).unwrap(), b"payload");
}

// ── Failure modes ──

#[test]
fn encrypt_without_recipients_fails() {
    let err = encrypt(&b"data"[..], Vec::new(), &[]).unwrap_err();
    assert!(matches!(err, CryptoError::EncryptFailed(_)));
}

#[test]
fn decrypt_without_identities_fails() {
    let key = ed25519_key();
    let sealed = seal(b"data", &[&key]);
    let err = decrypt_to_vec(sealed.as_slice(), &[]).unwrap_err();
    assert!(matches!(err, CryptoError::DecryptFailed(_)));
}

#[test]
fn truncated_envelope_fails() {
    let key = ed25519_key();
    let plaintext = vec![0x5Au8; 100_000];
    let sealed = seal(&plaintext, &[&key]);

    let truncated = &sealed[..sealed.len() - 17];
    let err = decrypt_to_vec(truncated, &[identity(&key)]).unwrap_err();
    assert!(matches!(err, CryptoError::DecryptFailed(_)));
}

#[test]
fn envelope_cut_at_chunk_boundary_fails() {
    let key = ed25519_key();
    let plaintext = vec![0x33u8; 2 * 65536];
    let sealed = seal(&plaintext, &[&key]);

    // Remove one full chunk and its tag; what remains ends on a non-final chunk.
    let cut = sealed.len() - (65536 + 16);
    let err = decrypt_to_vec(&sealed[..cut], &[identity(&key)]).unwrap_err();
    assert!(matches!(err, CryptoError::DecryptFailed(_)));
}

#[test]
fn tampered_payload_fails() {
    let key = ed25519_key();
    let mut sealed = seal(b"integrity protected payload", &[&key]);
    let last = sealed.len() - 1;
    sealed[last] ^= 0x01;

    let err = decrypt_to_vec(sealed.as_slice(), &[identity(&key)]).unwrap_err();
    assert!(matches!(err, CryptoError::DecryptFailed(_)));
}

#[test]
fn tampered_header_fails() {
    let key = ed25519_key();
    let mut sealed = seal(b"payload", &[&key]);
    // Flip a byte inside the stanza body, well before the header MAC.
    let pos = sealed.iter().position(|b| *b == b'\n').unwrap() + 20;
    sealed[pos] ^= 0x01;

    assert!(decrypt_to_vec(sealed.as_slice(), &[identity(&key)]).is_err());
}

#[test]
fn garbage_input_fails() {
    let key = ed25519_key();
    let err = decrypt_to_vec(&b"definitely not an envelope"[..], &[identity(&key)]).unwrap_err();
    assert!(matches!(err, CryptoError::DecryptFailed(_)));
}
