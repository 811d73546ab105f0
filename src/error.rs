//! Error taxonomy for the audit engine.
//!
//! Every variant here is file- or repository-scoped. The scanner logs them and
//! keeps going; only the CLI layer decides whether a run failed overall.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while auditing a repository.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Ownership rules or configuration could not be loaded.
    #[error("configuration error in {}: {reason}", .path.display())]
    Configuration { path: PathBuf, reason: String },

    /// A candidate file could not be read as UTF-8 text.
    #[error("cannot read {} as text: {source}", .path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A requested repository root does not exist.
    #[error("repository path {} does not exist", .0.display())]
    MissingRepository(PathBuf),

    /// A library pattern failed to compile.
    #[error("invalid pattern {pattern:?} for {library}: {source}")]
    Pattern {
        library: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A library spec is well-formed regex but cannot be used.
    #[error("invalid library {library}: {reason}")]
    InvalidLibrary { library: String, reason: String },

    /// A file exceeds the per-file size guard.
    #[error("{} is {size} bytes, over the {limit} byte limit", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },
}

impl AuditError {
    pub fn configuration(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AuditError::Configuration {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
