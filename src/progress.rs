//! Progress-callback trait for per-file conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the runner works through the batch. The CLI uses this to drive
//! its progress bar; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use docs2md::{ConversionConfig, ConversionProgressCallback, ConversionResult};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, result: &ConversionResult) {
//!         let n = self.done.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{n}: {}", result.source_path.display());
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::format::DocumentType;
use crate::output::ConversionResult;
use std::path::Path;
use std::sync::Arc;

/// Called by the runner as it processes each file.
///
/// Implementations must be `Send + Sync`: in parallel mode `on_file_start`
/// and `on_file_complete` are called concurrently from blocking-pool
/// threads. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after discovery, before any file is converted.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called on the worker just before the adapter runs.
    fn on_file_start(&self, path: &Path, document_type: DocumentType) {
        let _ = (path, document_type);
    }

    /// Called once per file with its final result, success or failure.
    fn on_file_complete(&self, result: &ConversionResult) {
        let _ = result;
    }

    /// Called once after every file has a result.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
