//! Error types used across posixfs.
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::encoding::Encoding;

/// Filesystem step that produced a [`Error::FileSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Create,
    Write,
    Flush,
    SyncFile,
    Rename,
    OpenDir,
    SyncDir,
    Remove,
}

impl FsOp {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FsOp::Create => "create",
            FsOp::Write => "write",
            FsOp::Flush => "flush",
            FsOp::SyncFile => "sync_file",
            FsOp::Rename => "rename",
            FsOp::OpenDir => "open_dir",
            FsOp::SyncDir => "sync_dir",
            FsOp::Remove => "remove",
        }
    }
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by atomic writes and directory syncs.
#[derive(Debug, Error)]
pub enum Error {
    /// A create/open/write/rename/sync call failed.
    ///
    /// `cleanup` carries the error of the best-effort temporary file removal
    /// that followed, if that removal failed too. It never replaces `source`.
    #[error("filesystem error during {op} on {}: {source}", path.display())]
    FileSystem {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: io::Error,
        cleanup: Option<io::Error>,
    },

    /// The filesystem holding `path` cannot sync directories.
    #[error("directory sync not supported for {}: {source}", path.display())]
    UnsupportedOperation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The rename succeeded, so `target` shows the new content, but the
    /// directory sync that makes the rename durable failed.
    #[error("{} was replaced but the rename may not be durable: {cause}", target.display())]
    PartiallyDurableCommit {
        target: PathBuf,
        #[source]
        cause: Box<Error>,
    },

    /// The text holds a character the configured encoding cannot represent.
    #[error("character {character:?} cannot be encoded as {encoding}")]
    Unencodable { encoding: Encoding, character: char },
}

/// Convenient alias for results returning a posixfs [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn fs(op: FsOp, path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::FileSystem {
            op,
            path: path.as_ref().to_path_buf(),
            source,
            cleanup: None,
        }
    }

    /// Attach a failed temp removal as a secondary note.
    ///
    /// Only `FileSystem` errors carry the note; any other error is returned
    /// unchanged and the removal failure is logged instead.
    pub(crate) fn with_cleanup(self, removal: io::Error) -> Self {
        match self {
            Error::FileSystem {
                op,
                path,
                source,
                cleanup: None,
            } => Error::FileSystem {
                op,
                path,
                source,
                cleanup: Some(removal),
            },
            other => {
                log::warn!(target: "posixfs", "temporary file removal failed: {removal}");
                other
            }
        }
    }

    /// The filesystem step that failed, if this is a `FileSystem` error.
    #[must_use]
    pub fn op(&self) -> Option<FsOp> {
        match self {
            Error::FileSystem { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// The secondary temp removal failure, if one was recorded.
    #[must_use]
    pub fn cleanup_error(&self) -> Option<&io::Error> {
        match self {
            Error::FileSystem { cleanup, .. } => cleanup.as_ref(),
            _ => None,
        }
    }

    /// True when the new content is already visible at the target.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Error::PartiallyDurableCommit { .. })
    }

    /// True when directory syncing is unsupported, directly or as the cause
    /// of a partially durable commit.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        match self {
            Error::UnsupportedOperation { .. } => true,
            Error::PartiallyDurableCommit { cause, .. } => cause.is_unsupported(),
            _ => false,
        }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::FileSystem { source, .. } => source,
            Error::UnsupportedOperation { source, .. } => {
                io::Error::new(io::ErrorKind::Unsupported, source)
            }
            other @ Error::PartiallyDurableCommit { .. } => io::Error::other(other),
            other @ Error::Unencodable { .. } => {
                io::Error::new(io::ErrorKind::InvalidData, other)
            }
        }
    }
}
