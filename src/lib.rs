//! qr_workers - background QR decoding workers
//!
//! Each worker wraps an external QR decoder (`rqrr` or `quircs`) behind a
//! postMessage-style protocol: a `detect` request carrying RGBA image data
//! goes in, exactly one `result` or `error` response comes out.
//!
//! ```no_run
//! use qr_workers::{Backend, WorkerConfig, spawn_backend, tools::load_image_data};
//!
//! let worker = spawn_backend(&WorkerConfig::new(Backend::Quirc)).unwrap();
//! let image = load_image_data("wikipedia.jpg").unwrap();
//! for barcode in worker.detect_blocking(image).unwrap() {
//!     println!("{}", barcode.raw_value);
//! }
//! ```

/// Worker configuration and environment overrides
pub mod config;
/// Decoder backends behind the `Decoder` trait
pub mod decoder;
/// Error types
pub mod error;
/// Image, point and barcode types
pub mod models;
/// Request/response wire shapes
pub mod protocol;
/// Image loading and dataset iteration
pub mod tools;
/// Pixel conversion helpers
pub mod utils;
/// Protocol adapter and threaded worker
pub mod worker;

pub use config::WorkerConfig;
pub use decoder::{Backend, Decoder, QuircDecoder, RqrrDecoder};
pub use error::{DecodeError, ImageError, WorkerError};
pub use models::{BarcodeFormat, BoundingBox, DetectedBarcode, ImageData, LumaImage, Point};
pub use protocol::{Argument, DETECT, Request, Response};
pub use worker::{DetectOptions, WorkerAdapter, WorkerHandle, spawn_backend, spawn_worker};

/// Decode one image synchronously on the calling thread, without a worker.
///
/// Same validation, inverted retry and error mapping as a worker request.
pub fn detect(image: &ImageData, backend: Backend) -> Result<Vec<DetectedBarcode>, WorkerError> {
    let mut adapter = WorkerAdapter::new(backend.decoder(), DetectOptions::default());
    adapter.detect(image)
}
