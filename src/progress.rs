//! Progress-callback trait for conversion lifecycle events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to be told
//! when the engine starts and how the conversion ended. The CLI uses it to
//! drive its spinner; library callers can forward the events anywhere.
//!
//! # Example
//!
//! ```rust
//! use latex2pdf::{ConversionProgressCallback, ConversionConfig, Engine};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct Announce;
//!
//! impl ConversionProgressCallback for Announce {
//!     fn on_compile_start(&self, engine: Engine) {
//!         eprintln!("running {engine}…");
//!     }
//!
//!     fn on_compile_complete(&self, pdf_path: &Path, bytes: u64) {
//!         eprintln!("{} ({bytes} bytes)", pdf_path.display());
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Announce) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::config::Engine;
use std::path::Path;
use std::sync::Arc;

/// Called by the converter at each lifecycle step.
///
/// Implementations must be `Send + Sync`: independent conversions may share
/// one config across threads. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the source is on disk, right before the engine is spawned.
    fn on_compile_start(&self, engine: Engine) {
        let _ = engine;
    }

    /// Called after the PDF has been placed at its destination.
    ///
    /// # Arguments
    /// * `pdf_path` — absolute destination path
    /// * `bytes`    — size of the placed PDF
    fn on_compile_complete(&self, pdf_path: &Path, bytes: u64) {
        let _ = (pdf_path, bytes);
    }

    /// Called when the conversion fails, whatever the stage.
    fn on_compile_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        last_bytes: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_compile_start(&self, _engine: Engine) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_compile_complete(&self, _pdf_path: &Path, bytes: u64) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.last_bytes.store(bytes as usize, Ordering::SeqCst);
        }

        fn on_compile_error(&self, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_compile_start(Engine::PdfLatex);
        cb.on_compile_complete(Path::new("/tmp/out.pdf"), 1234);
        cb.on_compile_error("boom");
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_compile_start(Engine::XeLatex);
        tracker.on_compile_complete(Path::new("/tmp/a.pdf"), 2048);
        tracker.on_compile_start(Engine::XeLatex);
        tracker.on_compile_error("LaTeX compilation failed");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.last_bytes.load(Ordering::SeqCst), 2048);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_compile_start(Engine::LuaLatex);
    }
}
