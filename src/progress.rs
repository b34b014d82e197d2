//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::TocConfigBuilder::progress_callback`] to receive events
//! as [`crate::convert::fix_toc_files`] works through a set of documents.
//!
//! # Example
//!
//! ```rust
//! use docx2md_toc::{BatchProgressCallback, TocConfig, TocStatus};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rebuilt: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, _index: usize, _total: usize, path: &Path, status: TocStatus) {
//!         if status.is_reconstructed() {
//!             self.rebuilt.fetch_add(1, Ordering::SeqCst);
//!         }
//!         eprintln!("{}: {status}", path.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { rebuilt: AtomicUsize::new(0) });
//!
//! let config = TocConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::TocStatus;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch API as it processes each document.
///
/// Documents are processed concurrently, so `on_file_start`,
/// `on_file_complete` and `on_file_error` may be called from different
/// threads at once. All methods default to no-ops.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any file is read.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file is read.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position of the file in the input list
    /// * `total`: number of files in the batch
    fn on_file_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called when a file was processed and written (or left alone).
    ///
    /// `status` tells whether the TOC was rebuilt or why it was kept.
    fn on_file_complete(&self, index: usize, total: usize, path: &Path, status: TocStatus) {
        let _ = (index, total, path, status);
    }

    /// Called when a file could not be read or written.
    fn on_file_error(&self, index: usize, total: usize, path: &Path, error: &str) {
        let _ = (index, total, path, error);
    }

    /// Called once after every file has been attempted.
    ///
    /// # Arguments
    /// * `total_files`:   files in the batch
    /// * `rebuilt_count`: files whose TOC was reconstructed
    fn on_batch_complete(&self, total_files: usize, rebuilt_count: usize) {
        let _ = (total_files, rebuilt_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TocConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
