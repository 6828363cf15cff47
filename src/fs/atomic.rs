//! Commit protocol for atomic file replacement.
//!
//! Sequence: `flush(tmp) -> [fsync(tmp)] -> rename(tmp, target) -> [fsync(parent)]`.
//! The bracketed steps run only for durable writes. The rename is the single
//! atomicity boundary: before it the target is untouched, after it the target
//! holds the full new content.
use std::io;
use std::path::Path;
use std::time::Instant;

use rustix::io::retry_on_intr;
use serde_json::json;

use super::{errno_to_io, fsync_directory, parent_dir, TempFile};
use crate::logging::audit::{AuditCtx, Step};
use crate::options::{InjectedFault, WriteOptions};
use crate::types::{Error, FsOp, Result, WriterState};

fn injected(step: &str) -> io::Error {
    io::Error::other(format!("injected fault: {step}"))
}

fn elapsed_ms(t0: Instant) -> u64 {
    u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Rename `from` over `to`, replacing any existing entry.
///
/// # Errors
///
/// Returns the IO error of the rename; `to` is unchanged in that case.
pub fn rename_replace(from: &Path, to: &Path) -> io::Result<()> {
    retry_on_intr(|| rustix::fs::rename(from, to)).map_err(errno_to_io)
}

/// Delete the staging file and move to `Aborted`.
///
/// # Errors
///
/// Returns the removal error; the caller decides whether it becomes a
/// secondary note or a log line.
pub(crate) fn abort(temp: TempFile, audit: &AuditCtx<'_>, state: &mut WriterState) -> io::Result<()> {
    debug_assert!(!state.is_visible(), "abort after rename");
    let path = temp.path().to_path_buf();
    let from = *state;
    let res = temp.discard();
    *state = WriterState::Aborted;
    let ev = audit
        .step(Step::Abort)
        .path(&path)
        .field("from_state", json!(from.as_str()));
    match &res {
        Ok(()) => ev.emit_success(),
        Err(e) => ev.error(e).emit_warn(),
    }
    res
}

/// Abort on behalf of `err`, attaching a removal failure to it.
pub(crate) fn abort_with(
    temp: TempFile,
    audit: &AuditCtx<'_>,
    state: &mut WriterState,
    err: Error,
) -> Error {
    match abort(temp, audit, state) {
        Ok(()) => err,
        Err(removal) => err.with_cleanup(removal),
    }
}

/// Publish `temp` at `target`.
///
/// # Errors
///
/// - Flush, file sync or rename failures abort: the staging file is removed
///   and `target` keeps its previous content.
/// - A failed directory sync after the rename yields
///   [`Error::PartiallyDurableCommit`]; the new content is already visible.
pub(crate) fn commit(
    mut temp: TempFile,
    target: &Path,
    options: &WriteOptions,
    audit: &AuditCtx<'_>,
    state: &mut WriterState,
) -> Result<()> {
    if let Err(e) = temp.flush() {
        let err = Error::fs(FsOp::Flush, temp.path(), e);
        return Err(abort_with(temp, audit, state, err));
    }

    if options.durable {
        *state = WriterState::SyncingFile;
        let t0 = Instant::now();
        let res = if options.faults(InjectedFault::FileSync) {
            Err(injected("file sync"))
        } else {
            temp.sync()
        };
        if let Err(e) = res {
            let err = Error::fs(FsOp::SyncFile, temp.path(), e);
            audit.step(Step::FileSync).path(temp.path()).error(&err).emit_failure();
            return Err(abort_with(temp, audit, state, err));
        }
        audit
            .step(Step::FileSync)
            .path(temp.path())
            .field("fsync_ms", json!(elapsed_ms(t0)))
            .emit_success();
    }

    if let Err(e) = temp.close() {
        let err = Error::fs(FsOp::Flush, temp.path(), e);
        return Err(abort_with(temp, audit, state, err));
    }

    *state = WriterState::Renaming;
    let res = if options.faults(InjectedFault::Rename) {
        Err(injected("rename"))
    } else {
        rename_replace(temp.path(), target)
    };
    if let Err(e) = res {
        let err = Error::fs(FsOp::Rename, target, e);
        audit.step(Step::Rename).path(temp.path()).error(&err).emit_failure();
        return Err(abort_with(temp, audit, state, err));
    }
    temp.disarm();
    audit.step(Step::Rename).path(temp.path()).emit_success();

    if options.durable {
        *state = WriterState::SyncingDirectory;
        let dir = parent_dir(target);
        let t0 = Instant::now();
        let res = if options.faults(InjectedFault::DirSync) {
            Err(Error::fs(FsOp::SyncDir, dir, injected("directory sync")))
        } else {
            fsync_directory(dir)
        };
        if let Err(cause) = res {
            audit.step(Step::DirSync).path(dir).error(&cause).emit_failure();
            *state = WriterState::Committed;
            audit
                .step(Step::Commit)
                .field("fully_durable", json!(false))
                .emit_warn();
            return Err(Error::PartiallyDurableCommit {
                target: target.to_path_buf(),
                cause: Box::new(cause),
            });
        }
        audit
            .step(Step::DirSync)
            .path(dir)
            .field("fsync_ms", json!(elapsed_ms(t0)))
            .emit_success();
    }

    *state = WriterState::Committed;
    audit
        .step(Step::Commit)
        .field("fully_durable", json!(options.durable))
        .emit_success();
    Ok(())
}
