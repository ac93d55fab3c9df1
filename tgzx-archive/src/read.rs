use crate::error::{ArchiveError, ArchiveResult};
use crate::path::{contained_target, lexical_normalize};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tar::{Archive, Entry, EntryType};
use tracing::debug;

/// Returns every entry name in stream order, directories and links included.
///
/// Content is skipped, never buffered. Names that are not UTF-8 are
/// shown lossily.
pub fn list<R: Read>(input: R) -> ArchiveResult<Vec<String>> {
    let mut archive = Archive::new(GzDecoder::new(input));
    let entries = archive.entries().map_err(read_failed)?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(read_failed)?;
        names.push(String::from_utf8_lossy(&entry.path_bytes()).into_owned());
    }
    drain(archive)?;
    Ok(names)
}

/// Extracts every entry under `destination` and returns the names processed.
///
/// Fails closed: the first entry whose target falls outside `destination`
/// aborts extraction with [`ArchiveError::PathTraversal`], and nothing after
/// it is written. Entries whose names are not UTF-8 are refused the same
/// way. Directories are created idempotently, regular files are truncated
/// and rewritten. Symbolic links and other special entries are reported but
/// never materialized.
pub fn extract<R: Read>(input: R, destination: &Path) -> ArchiveResult<Vec<String>> {
    let root = std::path::absolute(destination)
        .map(|p| lexical_normalize(&p))
        .map_err(|e| {
            ArchiveError::ExtractFailed(format!("resolving {}: {e}", destination.display()))
        })?;

    let mut archive = Archive::new(GzDecoder::new(input));
    let entries = archive.entries().map_err(read_failed)?;

    let mut extracted = Vec::new();
    for entry in entries {
        let mut entry = entry.map_err(read_failed)?;
        let name = recorded_name(&entry)?;
        let target = contained_target(&root, &name)
            .ok_or_else(|| ArchiveError::PathTraversal { entry: name.clone() })?;

        match entry.header().entry_type() {
            EntryType::Directory => {
                fs::create_dir_all(&target).map_err(|e| write_failed(&name, e))?;
            }
            kind if kind.is_file() => {
                write_file(&mut entry, &target, &name)?;
            }
            kind => {
                debug!(entry = %name, ?kind, "not materializing entry");
            }
        }
        extracted.push(name);
    }

    drain(archive)?;
    Ok(extracted)
}

fn write_file<R: Read>(entry: &mut Entry<'_, R>, target: &Path, name: &str) -> ArchiveResult<()> {
    let size = entry.header().size().map_err(|e| write_failed(name, e))?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| write_failed(name, e))?;
    }
    // Never write through a link left at the target path.
    if fs::symlink_metadata(target).is_ok_and(|m| m.file_type().is_symlink()) {
        fs::remove_file(target).map_err(|e| write_failed(name, e))?;
    }

    let mut file = File::create(target).map_err(|e| write_failed(name, e))?;
    let written = io::copy(entry, &mut file).map_err(|e| write_failed(name, e))?;
    if written != size {
        return Err(ArchiveError::ExtractFailed(format!(
            "{name}: expected {size} bytes, got {written}"
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = entry.header().mode().map_err(|e| write_failed(name, e))?;
        fs::set_permissions(target, fs::Permissions::from_mode(mode & 0o777))
            .map_err(|e| write_failed(name, e))?;
    }

    Ok(())
}

fn recorded_name<R: Read>(entry: &Entry<'_, R>) -> ArchiveResult<String> {
    String::from_utf8(entry.path_bytes().into_owned()).map_err(|e| {
        ArchiveError::ExtractFailed(format!(
            "entry name is not UTF-8: {}",
            String::from_utf8_lossy(e.as_bytes())
        ))
    })
}

/// Reads the gzip stream to its end so the trailer CRC and length are
/// checked. tar stops at the end-of-archive marker, before the trailer.
fn drain<R: Read>(archive: Archive<GzDecoder<R>>) -> ArchiveResult<()> {
    let mut decoder = archive.into_inner();
    io::copy(&mut decoder, &mut io::sink()).map_err(read_failed)?;
    Ok(())
}

fn read_failed(err: io::Error) -> ArchiveError {
    ArchiveError::ExtractFailed(format!("reading archive: {err}"))
}

fn write_failed(name: &str, err: io::Error) -> ArchiveError {
    ArchiveError::ExtractFailed(format!("{name}: {err}"))
}
