//! Progress-callback trait for per-page padding events.
//!
//! Inject an [`Arc<dyn PaddingProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to observe a
//! document moving through the pipeline. The CLI uses it to drive a terminal
//! progress bar; the HTTP server runs without one.
//!
//! # Example
//!
//! ```rust
//! use pdf_margin::{PaddingProgressCallback, PipelineConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     padded: AtomicUsize,
//! }
//!
//! impl PaddingProgressCallback for CountingCallback {
//!     fn on_page_padded(&self, page_num: usize, total_pages: usize) {
//!         self.padded.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("padded {page_num}/{total_pages}");
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { padded: AtomicUsize::new(0) });
//! let config = PipelineConfig::builder()
//!     .progress_callback(cb as Arc<dyn PaddingProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it works through a document.
///
/// Pages are processed strictly in order on one blocking thread, so calls
/// never overlap for a single document. All methods default to no-ops.
pub trait PaddingProgressCallback: Send + Sync {
    /// Called once every page has been rasterised.
    fn on_document_loaded(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after the margin has been applied to one page (1-indexed).
    fn on_page_padded(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called once the output PDF has been serialised.
    fn on_document_assembled(&self, total_pages: usize, output_bytes: usize) {
        let _ = (total_pages, output_bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PaddingProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn PaddingProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        loaded: AtomicUsize,
        padded: Mutex<Vec<usize>>,
        bytes: AtomicUsize,
    }

    impl PaddingProgressCallback for TrackingCallback {
        fn on_document_loaded(&self, total_pages: usize) {
            self.loaded.store(total_pages, Ordering::SeqCst);
        }

        fn on_page_padded(&self, page_num: usize, _total_pages: usize) {
            self.padded.lock().unwrap().push(page_num);
        }

        fn on_document_assembled(&self, _total_pages: usize, output_bytes: usize) {
            self.bytes.store(output_bytes, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_document_loaded(3);
        cb.on_page_padded(1, 3);
        cb.on_document_assembled(3, 1024);
    }

    #[test]
    fn tracking_callback_receives_events_in_order() {
        let tracker = TrackingCallback::default();
        tracker.on_document_loaded(3);
        for page in 1..=3 {
            tracker.on_page_padded(page, 3);
        }
        tracker.on_document_assembled(3, 4096);

        assert_eq!(tracker.loaded.load(Ordering::SeqCst), 3);
        assert_eq!(*tracker.padded.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(tracker.bytes.load(Ordering::SeqCst), 4096);
    }

    #[test]
    fn arc_dyn_callback_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn PaddingProgressCallback>();
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_document_loaded(1);
    }
}
