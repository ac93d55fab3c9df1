//! Resolving a public identifier into encryption recipients.
//!
//! A key listing is newline-delimited authorized-key text, one public key per
//! line, as served by `https://github.com/<user>.keys`. Lines that do not
//! parse as a supported key are logged and skipped; only an empty result is
//! an error.

use crate::config::TgzxConfig;
use crate::error::{CoreError, CoreResult};
use reqwest::Client;
use std::future::Future;
use tgzx_crypto::Recipient;
use tracing::{debug, info, warn};

/// Characters of a rejected key line included in the warning.
const PREVIEW_CHARS: usize = 40;

/// Retrieves the raw key listing for an identifier.
pub trait KeySource {
    fn fetch(&self, identifier: &str) -> impl Future<Output = CoreResult<String>> + Send;
}

/// Fetches key listings over HTTP from `{base_url}/{identifier}.keys`.
#[derive(Clone, Debug)]
pub struct HttpKeySource {
    client: Client,
    base_url: String,
}

impl HttpKeySource {
    /// Builds a client with the configured request timeout.
    pub fn new(config: &TgzxConfig) -> CoreResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CoreError::Config(format!("building HTTP client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    /// Uses an existing client, e.g. one shared with other callers.
    pub fn with_client(client: Client, config: &TgzxConfig) -> Self {
        Self {
            client,
            base_url: config.keys_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn listing_url(&self, identifier: &str) -> String {
        format!("{}/{identifier}.keys", self.base_url)
    }
}

impl KeySource for HttpKeySource {
    fn fetch(&self, identifier: &str) -> impl Future<Output = CoreResult<String>> + Send {
        async move {
            check_identifier(identifier)?;
            let url = self.listing_url(identifier);
            debug!(%url, "fetching key listing");

            let fetch_failed = |e: reqwest::Error| CoreError::FetchFailed {
                identifier: identifier.to_string(),
                reason: e.to_string(),
            };
            self.client
                .get(&url)
                .send()
                .await
                .map_err(fetch_failed)?
                .error_for_status()
                .map_err(fetch_failed)?
                .text()
                .await
                .map_err(fetch_failed)
        }
    }
}

/// Identifiers become a URL path segment, so only plain names are allowed.
fn check_identifier(identifier: &str) -> CoreResult<()> {
    let plain = !identifier.is_empty()
        && identifier != "."
        && identifier != ".."
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if plain {
        Ok(())
    } else {
        Err(CoreError::FetchFailed {
            identifier: identifier.to_string(),
            reason: "invalid identifier".to_string(),
        })
    }
}

/// Fetches the listing for `identifier` and parses it into recipients.
pub async fn resolve_recipients<S: KeySource>(
    source: &S,
    identifier: &str,
) -> CoreResult<Vec<Recipient>> {
    let listing = source.fetch(identifier).await?;
    let recipients = parse_key_listing(identifier, &listing)?;
    info!(identifier, recipients = recipients.len(), "resolved recipients");
    Ok(recipients)
}

/// Parses every non-blank line of a listing, in order.
///
/// Duplicates are kept. Fails with [`CoreError::NoValidKeys`] when nothing
/// parsed, whether the listing was empty or held only unsupported keys.
pub fn parse_key_listing(identifier: &str, listing: &str) -> CoreResult<Vec<Recipient>> {
    let mut recipients = Vec::new();
    let mut lines = 0usize;

    for line in listing.lines().map(str::trim).filter(|l| !l.is_empty()) {
        lines += 1;
        match Recipient::parse(line) {
            Ok(recipient) => recipients.push(recipient),
            Err(e) => warn!(
                identifier,
                key = %preview(line),
                error = %e,
                "skipping key"
            ),
        }
    }

    if recipients.is_empty() {
        if lines == 0 {
            warn!(identifier, "key listing is empty");
        } else {
            warn!(identifier, lines, "key listing has no supported keys");
        }
        return Err(CoreError::NoValidKeys {
            identifier: identifier.to_string(),
        });
    }
    Ok(recipients)
}

fn preview(line: &str) -> String {
    match line.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &line[..end]),
        None => line.to_string(),
    }
}
