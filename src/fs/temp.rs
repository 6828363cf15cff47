//! Staging files created next to an atomic-write target.
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use rustix::fs::{openat, Mode, OFlags, CWD};
use rustix::io::retry_on_intr;
use uuid::Uuid;

use super::{errno_to_io, parent_dir, retry_interrupted};
use crate::constants::{
    TMP_BASE_MAX, TMP_FALLBACK_NAME, TMP_NAME_ATTEMPTS, TMP_SUFFIX, TMP_TOKEN_LEN,
};
use crate::types::{Error, FsOp, Result};

/// An exclusively owned, uniquely named sibling of a target file.
///
/// Dropping an armed `TempFile` removes it from disk; [`TempFile::disarm`]
/// is called once the file has been renamed into place.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    file: Option<BufWriter<File>>,
    armed: bool,
}

/// `.{fname}.{pid}.{token}.posixfs.tmp`, with `fname` capped at `TMP_BASE_MAX` bytes.
fn tmp_name(target: &Path, pid: u32, token: &str) -> OsString {
    let base = target
        .file_name()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| OsStr::new(TMP_FALLBACK_NAME));
    let bytes = base.as_bytes();
    let base = OsStr::from_bytes(&bytes[..bytes.len().min(TMP_BASE_MAX)]);

    let mut name = OsString::from(".");
    name.push(base);
    name.push(format!(".{pid}.{token}{TMP_SUFFIX}"));
    name
}

fn random_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(TMP_TOKEN_LEN);
    token
}

fn create_exclusive(path: &Path) -> io::Result<File> {
    let mode = Mode::RUSR | Mode::WUSR | Mode::RGRP | Mode::WGRP | Mode::ROTH | Mode::WOTH;
    let fd = retry_on_intr(|| {
        openat(
            CWD,
            path,
            OFlags::WRONLY | OFlags::CREATE | OFlags::EXCL | OFlags::CLOEXEC,
            mode,
        )
    })
    .map_err(errno_to_io)?;
    Ok(File::from(fd))
}

impl TempFile {
    /// Create a fresh staging file in the directory of `target`.
    ///
    /// A name already taken on disk is regenerated with a new random token.
    /// With `preserve_permissions`, an existing regular-file target lends its
    /// permission bits to the new file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileSystem`] with [`FsOp::Create`] if the file cannot be
    /// created, or every generated name was already taken.
    pub fn create(target: &Path, preserve_permissions: bool) -> Result<Self> {
        Self::create_with(target, preserve_permissions, random_token)
    }

    fn create_with(
        target: &Path,
        preserve_permissions: bool,
        mut next_token: impl FnMut() -> String,
    ) -> Result<Self> {
        let dir = parent_dir(target);
        let pid = std::process::id();
        let mut attempts = 0;
        let (path, file) = loop {
            let path = dir.join(tmp_name(target, pid, &next_token()));
            match create_exclusive(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    attempts += 1;
                    log::debug!(target: "posixfs", "temporary name {} taken, retrying", path.display());
                    if attempts >= TMP_NAME_ATTEMPTS {
                        return Err(Error::fs(FsOp::Create, &path, e));
                    }
                }
                Err(e) => return Err(Error::fs(FsOp::Create, &path, e)),
            }
        };

        let mut temp = Self {
            path,
            file: None,
            armed: true,
        };
        if preserve_permissions {
            match fs::metadata(target) {
                Ok(meta) if meta.is_file() => {
                    if let Err(e) = file.set_permissions(meta.permissions()) {
                        let err = Error::fs(FsOp::Create, &temp.path, e);
                        return Err(match temp.discard() {
                            Ok(()) => err,
                            Err(removal) => err.with_cleanup(removal),
                        });
                    }
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!(
                    target: "posixfs",
                    "cannot read permissions of {}, using defaults: {e}",
                    target.display()
                ),
            }
        }
        temp.file = Some(BufWriter::with_capacity(
            crate::constants::WRITE_BUFFER_CAPACITY,
            file,
        ));
        Ok(temp)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn handle(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("temporary file already closed"))
    }

    /// Buffered write; may accept fewer bytes than offered.
    ///
    /// # Errors
    ///
    /// Propagates the underlying write error. The file content is then undefined.
    pub fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.handle()?.write(buf)
    }

    /// Push buffered bytes to the file.
    ///
    /// # Errors
    ///
    /// Propagates the underlying write error.
    pub fn flush(&mut self) -> io::Result<()> {
        self.handle()?.flush()
    }

    /// Flush, then fsync content and metadata.
    ///
    /// # Errors
    ///
    /// Propagates write or sync errors.
    pub fn sync(&mut self) -> io::Result<()> {
        let w = self.handle()?;
        w.flush()?;
        let f = w.get_ref();
        retry_interrupted(|| f.sync_all())
    }

    /// Flush and release the file descriptor. The file stays on disk.
    ///
    /// # Errors
    ///
    /// Propagates the final flush error.
    pub fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(w) => w.into_inner().map(drop).map_err(io::IntoInnerError::into_error),
            None => Ok(()),
        }
    }

    /// Keep the file on drop; it now lives under another name.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Close and delete the file. An already missing file counts as removed.
    ///
    /// # Errors
    ///
    /// Returns the removal error; the temporary file may then be left behind.
    pub fn discard(mut self) -> io::Result<()> {
        // Buffered bytes are garbage at this point; skip the flush.
        if let Some(w) = self.file.take() {
            let (file, _) = w.into_parts();
            drop(file);
        }
        self.armed = false;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}
