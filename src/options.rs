//! Configuration of a single atomic write.
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::logging::{FactsEmitter, LogFacts};
use crate::types::Encoding;

/// Failure forced at a given protocol step. Test knob only: lets callers
/// exercise abort and partial-commit paths without a faulty disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFault {
    /// Writes fail once this many bytes have been accepted in total.
    WriteAfter(usize),
    FileSync,
    Rename,
    DirSync,
}

/// Options fixed when a writer is created.
///
/// The serialisable fields let hosts embed this in their own config files;
/// the facts emitter and fault knob are set in code.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Sync the file before the rename and its directory after it.
    pub durable: bool,
    /// Encoding used by the text writer.
    pub encoding: Encoding,
    /// Copy the permission bits of an existing target onto the replacement.
    pub preserve_permissions: bool,
    #[serde(skip, default = "default_facts")]
    pub(crate) facts: Arc<dyn FactsEmitter>,
    #[serde(skip)]
    pub(crate) fault: Option<InjectedFault>,
}

fn default_facts() -> Arc<dyn FactsEmitter> {
    Arc::new(LogFacts)
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            durable: false,
            encoding: Encoding::Utf8,
            preserve_permissions: true,
            facts: default_facts(),
            fault: None,
        }
    }
}

impl fmt::Debug for WriteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOptions")
            .field("durable", &self.durable)
            .field("encoding", &self.encoding)
            .field("preserve_permissions", &self.preserve_permissions)
            .field("fault", &self.fault)
            .finish_non_exhaustive()
    }
}

impl WriteOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with `durable = true`: the write is acknowledged only after
    /// both the file and its directory entry reached storage.
    #[must_use]
    pub fn durable_preset() -> Self {
        Self {
            durable: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_durable(mut self, durable: bool) -> Self {
        self.durable = durable;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    #[must_use]
    pub fn with_facts(mut self, facts: Arc<dyn FactsEmitter>) -> Self {
        self.facts = facts;
        self
    }

    #[doc(hidden)]
    #[must_use]
    pub fn with_injected_fault(mut self, fault: InjectedFault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub(crate) fn faults(&self, step: InjectedFault) -> bool {
        self.fault == Some(step)
    }
}
