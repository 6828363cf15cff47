use std::path::Path;

use super::text::AtomicTextWriter;
use super::writer::AtomicWriter;
use crate::options::WriteOptions;
use crate::types::{Encoding, Error, Result};

/// Open a byte writer for `path`.
///
/// # Errors
///
/// See [`AtomicWriter::create`].
pub fn open_atomic_writer(path: impl AsRef<Path>, durable: bool) -> Result<AtomicWriter> {
    AtomicWriter::create(path, WriteOptions::default().with_durable(durable))
}

/// Open a text writer for `path`.
///
/// # Errors
///
/// See [`AtomicWriter::create`].
pub fn open_atomic_text_writer(
    path: impl AsRef<Path>,
    durable: bool,
    encoding: Encoding,
) -> Result<AtomicTextWriter> {
    AtomicTextWriter::create(
        path,
        WriteOptions::default()
            .with_durable(durable)
            .with_encoding(encoding),
    )
}

fn discard_quietly(abort: Result<()>) {
    if let Err(e) = abort {
        log::warn!(target: "posixfs", "abandoned write left its temporary file behind: {e}");
    }
}

/// Run `body` against a fresh writer for `path`.
///
/// `Ok` from `body` commits and returns its value. `Err` aborts without
/// committing and is returned unchanged.
///
/// # Errors
///
/// The error of `body`, or of creating/committing the writer.
pub fn with_atomic_writer<T, E, F>(
    path: impl AsRef<Path>,
    options: WriteOptions,
    body: F,
) -> std::result::Result<T, E>
where
    F: FnOnce(&mut AtomicWriter) -> std::result::Result<T, E>,
    E: From<Error>,
{
    let mut writer = AtomicWriter::create(path, options)?;
    match body(&mut writer) {
        Ok(value) => {
            writer.commit()?;
            Ok(value)
        }
        Err(e) => {
            discard_quietly(writer.abort());
            Err(e)
        }
    }
}

/// Text counterpart of [`with_atomic_writer`].
///
/// # Errors
///
/// The error of `body`, or of creating/committing the writer.
pub fn with_atomic_text_writer<T, E, F>(
    path: impl AsRef<Path>,
    options: WriteOptions,
    body: F,
) -> std::result::Result<T, E>
where
    F: FnOnce(&mut AtomicTextWriter) -> std::result::Result<T, E>,
    E: From<Error>,
{
    let mut writer = AtomicTextWriter::create(path, options)?;
    match body(&mut writer) {
        Ok(value) => {
            writer.commit()?;
            Ok(value)
        }
        Err(e) => {
            discard_quietly(writer.abort());
            Err(e)
        }
    }
}

/// Replace `path` with `data` in one call, using full options.
///
/// # Errors
///
/// Any error of the underlying writer, unchanged.
pub fn atomic_write_with(path: impl AsRef<Path>, data: &[u8], options: WriteOptions) -> Result<()> {
    with_atomic_writer(path, options, |w| w.write_chunk(data))
}

/// Replace `path` with `data`; either the whole payload lands or the old
/// content stays.
///
/// # Errors
///
/// Any error of the underlying writer, unchanged.
pub fn atomic_write_bytes(path: impl AsRef<Path>, data: impl AsRef<[u8]>, durable: bool) -> Result<()> {
    atomic_write_with(path, data.as_ref(), WriteOptions::default().with_durable(durable))
}

/// Replace `path` with `text` encoded as `encoding`.
///
/// # Errors
///
/// Any error of the underlying writer, unchanged. An unencodable `text`
/// leaves the target untouched.
pub fn atomic_write_text(
    path: impl AsRef<Path>,
    text: &str,
    durable: bool,
    encoding: Encoding,
) -> Result<()> {
    let options = WriteOptions::default()
        .with_durable(durable)
        .with_encoding(encoding);
    with_atomic_text_writer(path, options, |w| w.write_text(text))
}
