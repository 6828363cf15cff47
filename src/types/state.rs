//! Lifecycle of a scoped atomic writer.

/// Where a writer is in the commit protocol.
///
/// `Open -> Writing -> [SyncingFile] -> Renaming -> [SyncingDirectory] -> Committed`,
/// with any failure before the rename (or an explicit abort) going to `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Open,
    Writing,
    SyncingFile,
    Renaming,
    SyncingDirectory,
    Committed,
    Aborted,
}

impl WriterState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, WriterState::Committed | WriterState::Aborted)
    }

    /// True once the target shows the new content.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self, WriterState::SyncingDirectory | WriterState::Committed)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WriterState::Open => "open",
            WriterState::Writing => "writing",
            WriterState::SyncingFile => "syncing_file",
            WriterState::Renaming => "renaming",
            WriterState::SyncingDirectory => "syncing_directory",
            WriterState::Committed => "committed",
            WriterState::Aborted => "aborted",
        }
    }
}
