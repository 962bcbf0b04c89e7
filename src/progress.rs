//! Progress-callback trait for image resolution events.
//!
//! Inject an [`Arc<dyn ResolutionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events while the resolution pass fetches images. The transform that
//! follows is synchronous and fast, so it reports nothing.
//!
//! # Example
//!
//! ```rust
//! use edgequake_md2docx::{ConversionConfig, ResolutionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     resolved: AtomicUsize,
//! }
//!
//! impl ResolutionProgressCallback for CountingCallback {
//!     fn on_image_complete(&self, url: &str, bytes: usize) {
//!         let done = self.resolved.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("#{done}: {url} ({bytes} bytes)");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { resolved: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ResolutionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the resolution pass as it resolves each image.
///
/// Implementations must be `Send + Sync`; per-image methods may be called
/// concurrently and in any order. All methods default to no-ops.
pub trait ResolutionProgressCallback: Send + Sync {
    /// Called once before any resolver call, with the number of distinct URLs.
    fn on_resolution_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called just before the resolver is invoked for `url`.
    fn on_image_start(&self, url: &str) {
        let _ = url;
    }

    /// Called when `url` resolved to `bytes` bytes of image data.
    fn on_image_complete(&self, url: &str, bytes: usize) {
        let _ = (url, bytes);
    }

    /// Called when resolving `url` failed. The pass aborts right after.
    fn on_image_error(&self, url: &str, error: &str) {
        let _ = (url, error);
    }

    /// Called once after every image resolved successfully.
    fn on_resolution_complete(&self, total_images: usize) {
        let _ = total_images;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ResolutionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ResolutionProgressCallback>;
