//! Shared crate-wide constants for posixfs.
//!
//! Centralizes magic values used across modules.

/// Suffix of every staging file created next to a target.
/// The full name is `.{fname}.{pid}.{token}{TMP_SUFFIX}`; e.g., `.config.toml.4242.1f3a9c0d7e21.posixfs.tmp`.
/// Orphans left behind by a killed process can be found by this suffix.
pub const TMP_SUFFIX: &str = ".posixfs.tmp";

/// Number of hex digits of the random token embedded in a temporary name.
pub const TMP_TOKEN_LEN: usize = 12;

/// How many fresh names are tried when temporary file creation hits `EEXIST`.
pub const TMP_NAME_ATTEMPTS: usize = 16;

/// Fallback base name when the target path has no usable final component.
pub const TMP_FALLBACK_NAME: &str = "target";

/// Capacity of the write buffer in front of a temporary file.
pub const WRITE_BUFFER_CAPACITY: usize = 64 * 1024;

/// Longest prefix of the target's file name kept in a temporary name, in bytes.
/// Leaves room for the pid, token and suffix under the usual 255-byte `NAME_MAX`.
pub const TMP_BASE_MAX: usize = 200;

/// Subsystem label attached to every emitted fact.
pub const FACTS_SUBSYSTEM: &str = "posixfs";
