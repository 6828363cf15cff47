use std::path::Path;

use super::writer::AtomicWriter;
use crate::options::WriteOptions;
use crate::types::{Encoding, Result, WriterState};

/// Text flavour of [`AtomicWriter`]: encodes each string with the configured
/// [`Encoding`] and hands the bytes to the wrapped byte writer.
#[derive(Debug)]
pub struct AtomicTextWriter {
    inner: AtomicWriter,
    encoding: Encoding,
    scratch: Vec<u8>,
}

impl AtomicTextWriter {
    /// Create the staging file for `path`, encoding with `options.encoding`.
    ///
    /// # Errors
    ///
    /// See [`AtomicWriter::create`].
    pub fn create(path: impl AsRef<Path>, options: WriteOptions) -> Result<Self> {
        let encoding = options.encoding;
        Ok(Self {
            inner: AtomicWriter::create(path, options)?,
            encoding,
            scratch: Vec::new(),
        })
    }

    /// Encode and append `text`.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Unencodable`] if `text` does not fit the encoding; nothing is written.
    /// - Write errors as for [`AtomicWriter::write_chunk`].
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.scratch.clear();
        self.encoding.encode_into(text, &mut self.scratch)?;
        self.inner.write_chunk(&self.scratch)
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    #[must_use]
    pub fn target(&self) -> &Path {
        self.inner.target()
    }

    #[must_use]
    pub fn temp_path(&self) -> Option<&Path> {
        self.inner.temp_path()
    }

    #[must_use]
    pub fn state(&self) -> WriterState {
        self.inner.state()
    }

    /// The underlying byte writer, for mixing raw bytes (e.g. a BOM) into the text.
    pub fn bytes_mut(&mut self) -> &mut AtomicWriter {
        &mut self.inner
    }

    /// # Errors
    ///
    /// See [`AtomicWriter::commit`].
    pub fn commit(self) -> Result<()> {
        self.inner.commit()
    }

    /// # Errors
    ///
    /// See [`AtomicWriter::abort`].
    pub fn abort(self) -> Result<()> {
        self.inner.abort()
    }
}
