//! Key resolution and the archive/encryption pipeline for tgzx.
//!
//! - [`keys`] turns an identifier into [`Recipient`](tgzx_crypto::Recipient)s
//!   through a [`KeySource`]
//! - [`pipe`] is the bounded byte pipe between the two pipeline stages
//! - [`pipeline`] runs archiving and encryption concurrently
//! - [`operations`] composes them into create, list and extract
//!
//! Nothing here reads ambient state: the HTTP client, configuration and
//! cancellation token are all passed in by the caller.

pub mod config;
pub mod error;
pub mod keys;
pub mod operations;
pub mod pipe;
pub mod pipeline;
pub mod types;

pub use config::TgzxConfig;
pub use error::{CoreError, CoreResult};
pub use keys::{parse_key_listing, resolve_recipients, HttpKeySource, KeySource};
pub use operations::{create_archive, extract_archive, list_archive};
pub use pipeline::encrypt_paths;
pub use types::{CreateResult, ExtractResult, ListResult};
