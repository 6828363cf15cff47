//! Text encodings understood by the text writer.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::{Error, Result};

/// Encoding applied by [`crate::AtomicTextWriter`] before bytes reach the
/// temporary file. UTF-8 unless configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "utf-16le")]
    Utf16Le,
    #[serde(rename = "utf-16be")]
    Utf16Be,
    /// ISO-8859-1; code points above U+00FF are rejected.
    #[serde(rename = "latin-1", alias = "iso-8859-1")]
    Latin1,
}

impl Encoding {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16Le => "utf-16le",
            Encoding::Utf16Be => "utf-16be",
            Encoding::Latin1 => "latin-1",
        }
    }

    /// Encode `text`, appending to `out`. On failure `out` is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unencodable`] for characters outside the encoding's repertoire.
    pub fn encode_into(&self, text: &str, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Encoding::Utf8 => out.extend_from_slice(text.as_bytes()),
            Encoding::Utf16Le => {
                out.reserve(text.len() * 2);
                out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
            }
            Encoding::Utf16Be => {
                out.reserve(text.len() * 2);
                out.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
            }
            Encoding::Latin1 => {
                if let Some(character) = text.chars().find(|c| u32::from(*c) > 0xFF) {
                    return Err(Error::Unencodable {
                        encoding: *self,
                        character,
                    });
                }
                out.extend(text.chars().map(|c| u32::from(c) as u8));
            }
        }
        Ok(())
    }

    /// Encode `text` into a fresh buffer.
    ///
    /// # Errors
    ///
    /// See [`Encoding::encode_into`].
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_into(text, &mut out)?;
        Ok(out)
    }

    /// Decode bytes previously produced by [`Encoding::encode`].
    /// Returns `None` when `bytes` is not valid in this encoding.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Encoding::Utf16Le | Encoding::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return None;
                }
                let le = matches!(self, Encoding::Utf16Le);
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|p| {
                        if le {
                            u16::from_le_bytes([p[0], p[1]])
                        } else {
                            u16::from_be_bytes([p[0], p[1]])
                        }
                    })
                    .collect();
                String::from_utf16(&units).ok()
            }
            Encoding::Latin1 => Some(bytes.iter().map(|b| char::from(*b)).collect()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label that does not name a supported encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown text encoding: {0}")]
pub struct UnknownEncoding(pub String);

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let norm: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match norm.as_str() {
            "utf8" => Ok(Encoding::Utf8),
            "utf16le" => Ok(Encoding::Utf16Le),
            "utf16be" => Ok(Encoding::Utf16Be),
            "latin1" | "iso88591" => Ok(Encoding::Latin1),
            _ => Err(UnknownEncoding(s.to_string())),
        }
    }
}
