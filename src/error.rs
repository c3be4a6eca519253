//! Crate-level error types for md-orphan diagnostics.

use std::path::PathBuf;

/// Errors that stop md-orphan before or outside the crawl. Link problems are
/// never errors: they are collected as `LinkIssue`s and reported together.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An explicitly requested config file does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// An entry point given on the command line does not exist.
    #[error("{}: no such file", path.display())]
    EntryNotFound {
        /// Entry point as given by the user.
        path: PathBuf,
    },

    /// Exclusion pattern uses the recursive `**` wildcard.
    #[error("unsupported exclude pattern `{pattern}`: `**` is not supported")]
    GlobstarUnsupported {
        /// The offending pattern.
        pattern: String,
    },

    /// Exclusion pattern is not a valid glob (for example an unclosed `[`).
    #[error("invalid exclude pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why the glob compiler rejected it.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON report serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// No entry points were given.
    #[error("at least one entry point is required")]
    NoEntryPoints,

    /// Config file exists but is not valid TOML for md-orphan.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
