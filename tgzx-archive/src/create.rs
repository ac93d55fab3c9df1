use crate::error::{ArchiveError, ArchiveResult};
use crate::path::entry_name;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File, Metadata};
use std::io::{self, Read, Take, Write};
use std::path::Path;
use tar::{Builder, EntryType, Header, HeaderMode};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Writes a tar.gz archive of `paths` into `sink` and returns the sink.
///
/// Each path is walked recursively in file-name order. Symbolic links are
/// recorded as link entries and never followed, including when a path
/// argument itself is a link. The tar stream is finished before the gzip
/// stream, so the trailer blocks are compressed and flushed.
pub fn create<W: Write, P: AsRef<Path>>(sink: W, paths: &[P]) -> ArchiveResult<W> {
    let mut builder = Builder::new(GzEncoder::new(sink, Compression::default()));
    builder.follow_symlinks(false);

    let mut entries = 0usize;
    for root in paths {
        let root = root.as_ref();
        entries += add_path(&mut builder, root).map_err(|source| {
            ArchiveError::CreateArchiveFailed {
                path: root.to_path_buf(),
                source,
            }
        })?;
    }

    let encoder = builder.into_inner().map_err(ArchiveError::Finish)?;
    let sink = encoder.finish().map_err(ArchiveError::Finish)?;

    debug!(entries, "archive stream written");
    Ok(sink)
}

fn add_path<W: Write>(builder: &mut Builder<W>, root: &Path) -> io::Result<usize> {
    let mut count = 0;
    let walker = WalkDir::new(root)
        .follow_links(false)
        .follow_root_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        let name = entry_name(entry.path());
        if name.as_os_str().is_empty() {
            continue;
        }
        let metadata = entry.metadata()?;
        if append_entry(builder, entry.path(), &name, &metadata)? {
            count += 1;
        }
    }
    Ok(count)
}

/// Appends one filesystem object. Returns false for skipped special files.
fn append_entry<W: Write>(
    builder: &mut Builder<W>,
    path: &Path,
    name: &Path,
    metadata: &Metadata,
) -> io::Result<bool> {
    let mut header = Header::new_gnu();
    header.set_metadata_in_mode(metadata, HeaderMode::Complete);

    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        let target = fs::read_link(path)?;
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);
        builder.append_link(&mut header, name, &target)?;
    } else if file_type.is_dir() {
        header.set_entry_type(EntryType::Directory);
        header.set_size(0);
        builder.append_data(&mut header, name, io::empty())?;
    } else if file_type.is_file() {
        let size = metadata.len();
        header.set_entry_type(EntryType::Regular);
        header.set_size(size);
        let content = ExactReader::new(File::open(path)?, size);
        builder.append_data(&mut header, name, content)?;
    } else {
        warn!(path = %path.display(), "skipping special file");
        return Ok(false);
    }
    Ok(true)
}

/// Yields exactly `size` bytes, failing if the file shrank after it was stat'ed.
///
/// Growth is cut off by the `Take`; shrinkage would otherwise desync the
/// tar framing.
struct ExactReader<R> {
    inner: Take<R>,
}

impl<R: Read> ExactReader<R> {
    fn new(inner: R, size: u64) -> Self {
        Self {
            inner: inner.take(size),
        }
    }
}

impl<R: Read> Read for ExactReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 && !buf.is_empty() && self.inner.limit() > 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file shrank while archiving, {} bytes missing", self.inner.limit()),
            ));
        }
        Ok(n)
    }
}
