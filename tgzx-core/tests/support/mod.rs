//! Shared fixtures for tgzx-core integration tests.

#![allow(dead_code)]

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use tgzx_core::{CoreError, CoreResult, KeySource, TgzxConfig};
use tgzx_crypto::testing::TestKey;

/// Serves a fixed key listing for every identifier.
pub struct StaticKeySource(pub String);

impl StaticKeySource {
    pub fn for_keys(keys: &[&TestKey]) -> Self {
        let lines: Vec<&str> = keys.iter().map(|k| k.public_line.as_str()).collect();
        Self(lines.join("\n"))
    }
}

impl KeySource for StaticKeySource {
    fn fetch(&self, _identifier: &str) -> impl Future<Output = CoreResult<String>> + Send {
        let listing = self.0.clone();
        async move { Ok(listing) }
    }
}

/// Always fails, as an unreachable key server would.
pub struct UnreachableKeySource;

impl KeySource for UnreachableKeySource {
    fn fetch(&self, identifier: &str) -> impl Future<Output = CoreResult<String>> + Send {
        let identifier = identifier.to_string();
        async move {
            Err(CoreError::FetchFailed {
                identifier,
                reason: "connection refused".into(),
            })
        }
    }
}

/// Writes the private half of `key` to `dir/name` and returns its path.
pub fn write_identity(dir: &Path, name: &str, key: &TestKey) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, &key.private_pem).unwrap();
    path
}

/// A small pipe so tests cross many chunk boundaries.
pub fn small_pipe_config() -> TgzxConfig {
    TgzxConfig {
        pipe_capacity: 2,
        chunk_size: 512,
        ..TgzxConfig::default()
    }
}

/// Fills a file with `len` deterministic, poorly compressible bytes.
pub fn write_noise(path: &Path, len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491u32;
    let data: Vec<u8> = (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect();
    fs::write(path, &data).unwrap();
    data
}
