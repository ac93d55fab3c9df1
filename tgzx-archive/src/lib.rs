//! Streaming tar.gz codec for tgzx.
//!
//! - [`create`] walks filesystem paths into a gzip-compressed tar stream
//! - [`list`] returns entry names without materializing content
//! - [`extract`] writes entries under a destination root, refusing any
//!   entry that would land outside it
//!
//! Entry names are normalized when an archive is created: leading `/`,
//! `.` and unresolvable `..` components are dropped, so every name this
//! codec writes is relative. Extraction does not trust that and checks
//! every entry again.

mod create;
mod error;
mod path;
mod read;

pub use create::create;
pub use error::{ArchiveError, ArchiveResult};
pub use path::{contained_target, entry_name, lexical_normalize};
pub use read::{extract, list};
