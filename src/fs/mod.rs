//! Filesystem mechanisms: directory sync, staging files and the commit protocol.
//!
//! Nothing in here emits logs on its own except `atomic`, which reports each
//! protocol step through the writer's `FactsEmitter`.
use std::io;
use std::path::Path;

use rustix::io::Errno;

pub mod atomic;
pub mod dir;
pub mod temp;

pub use dir::fsync_directory;
pub use temp::TempFile;

pub(crate) fn errno_to_io(e: Errno) -> io::Error {
    io::Error::from_raw_os_error(e.raw_os_error())
}

/// Re-run `f` while it fails with `EINTR`.
pub(crate) fn retry_interrupted<T>(mut f: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    loop {
        match f() {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            other => return other,
        }
    }
}

/// Directory holding `target`; `.` when the path has no parent component.
#[must_use]
pub fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
