//! Runtime configuration for key resolution and the pipeline.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration threaded through the core by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TgzxConfig {
    /// Base URL key listings are served from; `{base}/{identifier}.keys`.
    pub keys_base_url: String,

    /// Timeout for a key listing request, in seconds.
    pub request_timeout_secs: u64,

    /// Chunks buffered between the archive and encryption stages.
    pub pipe_capacity: usize,

    /// Largest chunk handed across the pipe, in bytes.
    pub chunk_size: usize,
}

impl Default for TgzxConfig {
    fn default() -> Self {
        Self {
            keys_base_url: "https://github.com".to_string(),
            request_timeout_secs: 30,
            pipe_capacity: 16,
            chunk_size: 64 * 1024,
        }
    }
}

impl TgzxConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.keys_base_url.trim().is_empty() {
            return Err(CoreError::Config("keys_base_url is empty".to_string()));
        }
        if self.pipe_capacity == 0 {
            return Err(CoreError::Config("pipe_capacity must be at least 1".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(CoreError::Config("chunk_size must be at least 1".to_string()));
        }
        Ok(())
    }
}
