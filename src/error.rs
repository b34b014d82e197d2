//! Error types for the docx2md-toc library.
//!
//! Three distinct error types reflect three distinct failure modes:
//!
//! * [`FixTocError`]: **Fatal**: a file-level call cannot proceed at all
//!   (input missing, not UTF-8, output not writable, bad configuration).
//!   Returned as `Err(FixTocError)` from the `fix_toc_file*` functions.
//!
//! * [`TocMiss`]: **Non-fatal**: the document was read fine but its table
//!   of contents could not be located or rebuilt with enough confidence.
//!   The core never turns this into an `Err`; it is reported through
//!   [`crate::output::TocStatus`] and the document is returned unchanged.
//!
//! * [`FileError`]: **Non-fatal**: one document of a batch failed to read
//!   or write. Stored per file so one bad file does not abort the batch.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docx2md-toc library.
#[derive(Debug, Error)]
pub enum FixTocError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Markdown file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read but is not valid UTF-8 text.
    #[error("File is not valid UTF-8: '{path}' (invalid byte at offset {valid_up_to})")]
    NotUtf8 { path: PathBuf, valid_up_to: usize },

    /// Any other read failure.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a document's table of contents was left untouched.
///
/// Every variant guarantees the output text equals the input text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TocMiss {
    /// No header line looked like a table of contents.
    #[error("no table of contents found")]
    NoTocFound,

    /// A header was found but too few entry-shaped lines followed it.
    #[error(
        "insufficient TOC evidence: {entries} entry-shaped lines ({linked} linked), \
need {required} or a secondary TOC"
    )]
    InsufficientEvidence {
        entries: usize,
        linked: usize,
        required: usize,
    },

    /// The region was located but no line produced an entry.
    #[error("no TOC entries produced from {lines_examined} lines")]
    NoEntriesProduced { lines_examined: usize },
}

/// A non-fatal error for a single file of a batch.
///
/// Stored alongside [`crate::output::FileReport`]s in
/// [`crate::output::BatchOutput`]; the batch continues.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The document could not be read or decoded.
    #[error("{path}: read failed: {detail}")]
    ReadFailed { path: PathBuf, detail: String },

    /// The rebuilt document could not be written.
    #[error("{path}: write failed: {detail}")]
    WriteFailed { path: PathBuf, detail: String },

    /// The worker task died before reporting.
    #[error("{path}: worker failed: {detail}")]
    Worker { path: PathBuf, detail: String },
}

impl FileError {
    /// Build a per-file error from a fatal error raised while processing `path`.
    pub fn from_fatal(path: PathBuf, error: &FixTocError) -> Self {
        let detail = error.to_string();
        match error {
            FixTocError::OutputWriteFailed { .. } => FileError::WriteFailed { path, detail },
            FixTocError::Internal(_) => FileError::Worker { path, detail },
            _ => FileError::ReadFailed { path, detail },
        }
    }

    /// Path of the file that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            FileError::ReadFailed { path, .. }
            | FileError::WriteFailed { path, .. }
            | FileError::Worker { path, .. } => path,
        }
    }
}
