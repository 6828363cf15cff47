use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::fs::atomic;
use crate::fs::TempFile;
use crate::logging::audit::{AuditCtx, Step};
use crate::options::{InjectedFault, WriteOptions};
use crate::types::{Error, FsOp, Result, WriterState};

/// Scoped atomic writer for bytes.
///
/// Bytes go to a hidden sibling of the target. [`AtomicWriter::commit`]
/// publishes them with a single rename; anything else (an explicit
/// [`AtomicWriter::abort`], or dropping the writer, e.g. while an error
/// propagates through `?`) deletes the staging file and leaves the target as
/// it was.
///
/// ```no_run
/// use std::io::Write;
/// use posixfs::{AtomicWriter, WriteOptions};
///
/// let mut w = AtomicWriter::create("settings.json", WriteOptions::durable_preset())?;
/// w.write_all(b"{\"theme\": \"dark\"}")?;
/// w.commit()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct AtomicWriter {
    target: PathBuf,
    temp: Option<TempFile>,
    options: WriteOptions,
    state: WriterState,
    written: usize,
    // Kind of the first failed write; the temp content is undefined after it.
    poisoned: Option<io::ErrorKind>,
}

impl AtomicWriter {
    /// Create the staging file for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileSystem`] with [`FsOp::Create`] if the staging file
    /// cannot be created. The target is never touched.
    pub fn create(path: impl AsRef<Path>, options: WriteOptions) -> Result<Self> {
        let target = path.as_ref().to_path_buf();
        let audit = AuditCtx::new(&*options.facts, &target, options.durable);
        let temp = match TempFile::create(&target, options.preserve_permissions) {
            Ok(temp) => temp,
            Err(e) => {
                audit.step(Step::TempCreate).error(&e).emit_failure();
                return Err(e);
            }
        };
        audit.step(Step::TempCreate).path(temp.path()).emit_success();
        Ok(Self {
            target,
            temp: Some(temp),
            options,
            state: WriterState::Open,
            written: 0,
            poisoned: None,
        })
    }

    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Path of the staging file while the writer is live.
    #[must_use]
    pub fn temp_path(&self) -> Option<&Path> {
        self.temp.as_ref().map(TempFile::path)
    }

    #[must_use]
    pub fn state(&self) -> WriterState {
        self.state
    }

    #[must_use]
    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Bytes accepted so far.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.written
    }

    /// Append a whole chunk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileSystem`] with [`FsOp::Write`]; the writer must
    /// then be aborted or dropped, and a later commit refuses to publish.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        // `write_all` skips `write` for an empty chunk.
        if self.temp.is_some() && self.poisoned.is_none() {
            self.state = WriterState::Writing;
        }
        self.write_all(chunk).map_err(|e| {
            let path = self
                .temp_path()
                .map_or_else(|| self.target.clone(), Path::to_path_buf);
            Error::fs(FsOp::Write, path, e)
        })
    }

    fn finished(&self, op: FsOp) -> Error {
        Error::fs(
            op,
            &self.target,
            io::Error::other(format!("writer already {}", self.state.as_str())),
        )
    }

    fn audit(&self) -> AuditCtx<'_> {
        AuditCtx::new(&*self.options.facts, &self.target, self.options.durable)
    }

    /// Run the commit protocol, consuming the writer.
    ///
    /// # Errors
    ///
    /// - Any failure before the rename aborts: the target is unchanged.
    /// - [`Error::PartiallyDurableCommit`] when the content is visible but the
    ///   directory sync failed.
    pub fn commit(mut self) -> Result<()> {
        let temp = self.temp.take().ok_or_else(|| self.finished(FsOp::Rename))?;
        let audit = AuditCtx::new(&*self.options.facts, &self.target, self.options.durable);
        if let Some(kind) = self.poisoned {
            let err = Error::fs(
                FsOp::Write,
                temp.path(),
                io::Error::new(kind, "an earlier write to the temporary file failed"),
            );
            return Err(atomic::abort_with(temp, &audit, &mut self.state, err));
        }
        atomic::commit(temp, &self.target, &self.options, &audit, &mut self.state)
    }

    /// Abandon the write: delete the staging file, leave the target alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileSystem`] with [`FsOp::Remove`] if the staging file
    /// could not be deleted.
    pub fn abort(mut self) -> Result<()> {
        let temp = self.temp.take().ok_or_else(|| self.finished(FsOp::Remove))?;
        let path = temp.path().to_path_buf();
        let audit = AuditCtx::new(&*self.options.facts, &self.target, self.options.durable);
        atomic::abort(temp, &audit, &mut self.state).map_err(|e| Error::fs(FsOp::Remove, path, e))
    }
}

impl Write for AtomicWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(kind) = self.poisoned {
            return Err(io::Error::new(kind, "an earlier write to the temporary file failed"));
        }
        let mut len = buf.len();
        if let Some(InjectedFault::WriteAfter(limit)) = self.options.fault {
            let room = limit.saturating_sub(self.written);
            if room == 0 && !buf.is_empty() {
                self.poisoned = Some(io::ErrorKind::Other);
                return Err(io::Error::other("injected fault: write"));
            }
            len = len.min(room);
        }
        let Some(temp) = self.temp.as_mut() else {
            return Err(io::Error::other("writer already finished"));
        };
        self.state = WriterState::Writing;
        match temp.write(&buf[..len]) {
            Ok(n) => {
                self.written += n;
                Ok(n)
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::Interrupted {
                    self.poisoned = Some(e.kind());
                }
                Err(e)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.temp.as_mut() {
            Some(temp) => temp.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for AtomicWriter {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take() {
            debug_assert!(!self.state.is_terminal());
            let mut state = self.state;
            if let Err(e) = atomic::abort(temp, &self.audit(), &mut state) {
                log::warn!(
                    target: "posixfs",
                    "could not remove temporary file for {}: {e}",
                    self.target.display()
                );
            }
            self.state = state;
        }
    }
}
