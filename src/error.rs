//! Error types for the docs2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Docs2MdError`]: **Fatal**: the run cannot start at all (root path
//!   missing, single file of an unsupported type, invalid configuration).
//!   Returned as `Err(Docs2MdError)` from the top-level `convert*` functions,
//!   before any file has been touched.
//!
//! * [`FileError`]: **Non-fatal**: a single document failed (corrupt
//!   archive, missing PDF engine, unwritable destination) but the rest of the
//!   batch is fine. Stored inside [`crate::output::ConversionResult`] so
//!   callers see every failure next to every success.

use crate::format::DocumentType;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docs2md library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::output::ConversionResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Docs2MdError {
    // ── Discovery errors ──────────────────────────────────────────────────
    /// The input path does not exist.
    #[error("Input path not found: '{path}'\nCheck the path exists and is readable.")]
    PathNotFound { path: PathBuf },

    /// Process does not have read permission on the input path.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// A single file was given whose extension is not pdf, docx or pptx.
    #[error("Unsupported file type '{extension}' for '{path}'\nSupported: .pdf, .docx, .pptx")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The input directory could not be walked.
    #[error("Failed to scan '{path}': {detail}")]
    DiscoveryFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or environment validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document.
///
/// Stored alongside [`crate::output::ConversionResult`] when a file fails.
/// The batch always continues with the remaining files.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// Extension not in the supported set.
    #[error("Unsupported file type: {extension}")]
    UnsupportedFormat { extension: String },

    /// The format adapter could not read or parse the document.
    #[error("{format} extraction failed: {detail}")]
    ExtractionFailed { format: DocumentType, detail: String },

    /// A destination directory or file could not be written.
    #[error("Failed to write '{}': {detail}", path.display())]
    WriteFailed { path: PathBuf, detail: String },

    /// The worker running this file panicked.
    #[error("Worker panicked: {detail}")]
    WorkerPanicked { detail: String },
}

impl FileError {
    pub(crate) fn extraction(format: DocumentType, detail: impl Into<String>) -> Self {
        FileError::ExtractionFailed {
            format,
            detail: detail.into(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        FileError::WriteFailed {
            path: path.into(),
            detail: err.to_string(),
        }
    }
}
