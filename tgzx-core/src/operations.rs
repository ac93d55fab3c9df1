//! The create, list and extract operations.
//!
//! `create_archive` streams through the concurrent pipeline. Listing and
//! extraction decrypt the whole archive into memory first, so no entry is
//! processed before every chunk has authenticated. Those two block the
//! calling thread.

use crate::config::TgzxConfig;
use crate::error::{CoreError, CoreResult};
use crate::keys::{resolve_recipients, KeySource};
use crate::pipeline::encrypt_paths;
use crate::types::{CreateResult, ExtractResult, ListResult};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tgzx_crypto::{decrypt_to_vec, load_identity};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Creates an encrypted archive of `paths` readable by `identifier`'s keys.
///
/// On any failure after the output file was opened, the partial file is
/// removed.
pub async fn create_archive<S: KeySource>(
    source: &S,
    identifier: &str,
    output: &Path,
    paths: &[PathBuf],
    config: &TgzxConfig,
    cancel: &CancellationToken,
) -> CoreResult<CreateResult> {
    config.validate()?;
    let recipients = resolve_recipients(source, identifier).await?;
    let count = recipients.len();

    let file = File::create(output).map_err(|source| open_failed(output, source))?;
    let sealed = encrypt_paths(
        paths.to_vec(),
        recipients,
        BufWriter::new(file),
        config,
        cancel,
    )
    .await;

    let size = sealed
        .and_then(|out| {
            drop(out);
            fs::metadata(output)
                .map(|m| m.len())
                .map_err(|source| open_failed(output, source))
        })
        .inspect_err(|_| remove_partial(output))?;

    info!(
        file = %output.display(),
        recipients = count,
        size,
        "archive created"
    );
    Ok(CreateResult {
        file: output.display().to_string(),
        recipients: count,
        size,
    })
}

/// Lists the entry names of an encrypted archive.
pub fn list_archive(archive: &Path, identity_file: &Path) -> CoreResult<ListResult> {
    let plaintext = open_archive(archive, identity_file)?;
    let entries = tgzx_archive::list(plaintext.as_slice())?;

    info!(file = %archive.display(), count = entries.len(), "archive listed");
    Ok(ListResult {
        count: entries.len(),
        entries,
    })
}

/// Extracts an encrypted archive under `destination`, creating it if needed.
pub fn extract_archive(
    archive: &Path,
    identity_file: &Path,
    destination: &Path,
) -> CoreResult<ExtractResult> {
    let plaintext = open_archive(archive, identity_file)?;
    fs::create_dir_all(destination).map_err(|source| open_failed(destination, source))?;
    let files = tgzx_archive::extract(plaintext.as_slice(), destination)?;

    info!(
        file = %archive.display(),
        destination = %destination.display(),
        count = files.len(),
        "archive extracted"
    );
    Ok(ExtractResult {
        count: files.len(),
        files,
    })
}

fn open_archive(archive: &Path, identity_file: &Path) -> CoreResult<Vec<u8>> {
    let identity = load_identity(identity_file)?;
    let input = File::open(archive).map_err(|source| open_failed(archive, source))?;
    Ok(decrypt_to_vec(BufReader::new(input), &[identity])?)
}

fn open_failed(path: &Path, source: std::io::Error) -> CoreError {
    CoreError::OpenFile {
        path: path.to_path_buf(),
        source,
    }
}

fn remove_partial(output: &Path) {
    if let Err(e) = fs::remove_file(output) {
        warn!(file = %output.display(), error = %e, "failed to remove partial archive");
    }
}
