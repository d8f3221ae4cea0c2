//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ConverterConfigBuilder::progress_callback`] (or
//! [`crate::batch::BatchController::with_progress`]) to hear about each file
//! as the batch controller works through it. The CLI uses this to drive its
//! progress bar.
//!
//! # Example
//!
//! ```rust
//! use liteswitch::{BatchProgressCallback, ConverterConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, input: &Path, ok: bool) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {} {}", index, total, input.display(), ok);
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { done: AtomicUsize::new(0) });
//! let config = ConverterConfig::builder()
//!     .progress_callback(cb as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::format::Format;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch controller as it processes each file.
///
/// All methods default to no-ops. Events arrive sequentially from the thread
/// running the batch.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once the target is known, before the first file.
    fn on_batch_start(&self, total_files: usize, target: &Format) {
        let _ = (total_files, target);
    }

    /// Called before a file is examined.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in the batch
    /// * `total` — number of files in the batch
    fn on_file_start(&self, index: usize, total: usize, input: &Path) {
        let _ = (index, total, input);
    }

    /// Called after a file converted, failed or was skipped.
    ///
    /// `succeeded` is true only for a successful conversion.
    fn on_file_complete(&self, index: usize, total: usize, input: &Path, succeeded: bool) {
        let _ = (index, total, input, succeeded);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, skipped: usize) {
        let _ = (succeeded, failed, skipped);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConverterConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
