//! Directory metadata sync.
//!
//! A file-level fsync does not persist the directory entry that names the
//! file. Renames, creations and unlinks become durable only once the
//! containing directory itself is synced.
use std::io;
use std::path::Path;

use rustix::fd::OwnedFd;
use rustix::fs::{fsync, open, Mode, OFlags};
use rustix::io::{retry_on_intr, Errno};

use super::errno_to_io;
use crate::types::{Error, FsOp, Result};

/// Open a directory read-only with `O_DIRECTORY`.
///
/// # Errors
///
/// Returns an IO error if the path cannot be opened or is not a directory.
pub fn open_dir(dir: &Path) -> io::Result<OwnedFd> {
    retry_on_intr(|| {
        open(
            dir,
            OFlags::RDONLY | OFlags::DIRECTORY | OFlags::CLOEXEC,
            Mode::empty(),
        )
    })
    .map_err(errno_to_io)
}

fn sync_unsupported(e: Errno) -> bool {
    e == Errno::INVAL || e == Errno::NOTSUP || e == Errno::OPNOTSUPP || e == Errno::NOSYS
}

/// Force the metadata of directory `path` to durable storage.
///
/// The descriptor lives only for the duration of this call.
///
/// # Errors
///
/// - [`Error::FileSystem`] with [`FsOp::OpenDir`] or [`FsOp::SyncDir`] if the open or sync fails.
/// - [`Error::UnsupportedOperation`] if the filesystem cannot sync directories.
pub fn fsync_directory(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let dirfd = open_dir(path).map_err(|e| Error::fs(FsOp::OpenDir, path, e))?;
    match retry_on_intr(|| fsync(&dirfd)) {
        Ok(()) => Ok(()),
        Err(e) if sync_unsupported(e) => Err(Error::UnsupportedOperation {
            path: path.to_path_buf(),
            source: errno_to_io(e),
        }),
        Err(e) => Err(Error::fs(FsOp::SyncDir, path, errno_to_io(e))),
    }
}
