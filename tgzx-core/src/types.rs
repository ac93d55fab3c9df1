//! Operation results, serialized as the command output.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResult {
    /// Path of the encrypted archive as given by the caller.
    pub file: String,
    /// Number of recipients the archive was sealed to.
    pub recipients: usize,
    /// Size of the encrypted archive in bytes.
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResult {
    pub entries: Vec<String>,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractResult {
    pub files: Vec<String>,
    pub count: usize,
}
