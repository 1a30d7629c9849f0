//! Progress-callback trait for per-document and per-case events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events while a batch runs. The library knows nothing about how the host
//! displays them: a terminal bar, a log, a web page.
//!
//! # Example
//!
//! ```rust
//! use patdeck::{BatchProgressCallback, ExtractionConfig, FigureStatus};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     found: Arc<AtomicUsize>,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_figure_resolved(&self, index: usize, total: usize, status: FigureStatus) {
//!         if status == FigureStatus::Success {
//!             self.found.fetch_add(1, Ordering::SeqCst);
//!         }
//!         eprintln!("case {}/{}: {}", index, total, status);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     found: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::FigureStatus;
use std::sync::Arc;

/// Called by the batch runner as it works through documents and cases.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any document is read.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called after a document has been split into cases.
    fn on_document_parsed(&self, name: &str, cases: usize) {
        let _ = (name, cases);
    }

    /// Called when a document cannot be read; the batch continues.
    fn on_document_failed(&self, name: &str, error: &str) {
        let _ = (name, error);
    }

    /// Called before the figure of a case is looked up.
    ///
    /// # Arguments
    /// * `index` — 1-based position of the case in output order
    /// * `total` — number of cases in the batch
    fn on_figure_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called after the figure lookup of a case, successful or not.
    fn on_figure_resolved(&self, index: usize, total: usize, status: FigureStatus) {
        let _ = (index, total, status);
    }

    /// Called once at the end of the batch.
    ///
    /// # Arguments
    /// * `cases`      — records produced
    /// * `with_image` — records whose figure was found and rasterised
    fn on_batch_complete(&self, cases: usize, with_image: usize) {
        let _ = (cases, with_image);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        parsed: AtomicUsize,
        failed: AtomicUsize,
        resolved_ok: AtomicUsize,
        resolved_err: AtomicUsize,
        with_image: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_document_parsed(&self, _name: &str, cases: usize) {
            self.parsed.fetch_add(cases, Ordering::SeqCst);
        }

        fn on_document_failed(&self, _name: &str, _error: &str) {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }

        fn on_figure_resolved(&self, _index: usize, _total: usize, status: FigureStatus) {
            if status == FigureStatus::Success {
                self.resolved_ok.fetch_add(1, Ordering::SeqCst);
            } else {
                self.resolved_err.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn on_batch_complete(&self, _cases: usize, with_image: usize) {
            self.with_image.store(with_image, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_document_parsed("a.docx", 3);
        cb.on_document_failed("b.docx", "not a zip");
        cb.on_figure_start(1, 3);
        cb.on_figure_resolved(1, 3, FigureStatus::NoMatchingFile);
        cb.on_batch_complete(3, 0);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_document_parsed("a.docx", 2);
        tracker.on_document_parsed("b.docx", 1);
        tracker.on_document_failed("c.docx", "broken");
        tracker.on_figure_resolved(1, 3, FigureStatus::Success);
        tracker.on_figure_resolved(2, 3, FigureStatus::TokenNotFound);
        tracker.on_figure_resolved(3, 3, FigureStatus::Success);
        tracker.on_batch_complete(3, 2);

        assert_eq!(tracker.parsed.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.failed.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.resolved_ok.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.resolved_err.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.with_image.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn BatchProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_batch_start(1);
        cb.on_figure_start(1, 1);
    }
}
