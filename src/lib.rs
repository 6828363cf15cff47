#![forbid(unsafe_code)]
//! posixfs: atomic and optionally durable file replacement on POSIX filesystems.
//!
//! Safety model highlights:
//! - Content is staged in a uniquely named sibling of the target (`O_CREAT|O_EXCL`) and published with a single `rename`, so readers see the old file or the new one, never a mix.
//! - Durable writes follow `fsync(tmp) -> rename -> fsync(parent)`; a failed final directory sync is reported as `Error::PartiallyDurableCommit`, never as success.
//! - Any failure before the rename, and any writer dropped without commit, removes the staging file and leaves the target untouched.
//! - This crate forbids `unsafe` and uses `rustix` for syscalls.
//!
//! ```no_run
//! posixfs::atomic_write_bytes("state.bin", b"\x01\x02", true)?;
//! posixfs::atomic_write_text("notes.txt", "hello", false, posixfs::Encoding::Utf8)?;
//! posixfs::fsync_directory(".")?;
//! # Ok::<(), posixfs::Error>(())
//! ```

pub mod api;
pub mod constants;
pub mod fs;
pub mod logging;
pub mod options;
pub mod types;

pub use api::*;
pub use fs::fsync_directory;
pub use options::{InjectedFault, WriteOptions};
pub use types::{Encoding, Error, FsOp, Result, WriterState};
