//! Progress-callback trait for per-page processing events.
//!
//! Inject an [`Arc<dyn ProcessingProgressCallback>`] via
//! [`crate::config::ProcessingConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through each page. The CLI uses it to drive
//! an `indicatif` progress bar; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use docvision::{ProcessingConfig, ProcessingProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ProcessingProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, kind: &str) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({})", page_num, total_pages, kind);
//!     }
//! }
//!
//! let config = ProcessingConfig::builder()
//!     .api_key("sk-test")
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it processes each page.
///
/// Pages are processed sequentially, so events arrive in page order. All
/// methods have default no-op implementations.
pub trait ProcessingProgressCallback: Send + Sync {
    /// Called once after loading, before the first page is sent.
    fn on_run_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before the recognition request for a page.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page produced a non-error result.
    ///
    /// # Arguments
    /// * `kind` — the result kind (`"stats"`, `"markdown"`, `"html"`, `"text"`)
    fn on_page_complete(&self, page_num: usize, total_pages: usize, kind: &str) {
        let _ = (page_num, total_pages, kind);
    }

    /// Called when a page's recognition failed.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page has been attempted.
    fn on_run_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ProcessingProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ProcessingConfig`].
pub type ProgressCallback = Arc<dyn ProcessingProgressCallback>;
