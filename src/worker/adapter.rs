use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, warn};

use crate::config::{DEFAULT_MAX_PIXELS, WorkerConfig};
use crate::decoder::Decoder;
use crate::error::WorkerError;
use crate::models::{DetectedBarcode, ImageData, LumaImage};
use crate::protocol::{DETECT, Request, Response};

/// Knobs the adapter applies around every decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectOptions {
    /// Frames with more pixels are rejected
    pub max_pixels: usize,
    /// Retry on the inverted image when the first pass decodes nothing
    pub try_inverted: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
            try_inverted: true,
        }
    }
}

impl From<&WorkerConfig> for DetectOptions {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            max_pixels: config.max_pixels,
            try_inverted: config.try_inverted,
        }
    }
}

/// Message-protocol glue around one decoder
///
/// Turns every [`Request`] into exactly one [`Response`]. Validation
/// failures, decoder errors and decoder panics all come back as
/// `Response::Error`.
pub struct WorkerAdapter<D> {
    decoder: D,
    options: DetectOptions,
}

impl<D: Decoder> WorkerAdapter<D> {
    /// Wrap a decoder
    pub fn new(decoder: D, options: DetectOptions) -> Self {
        Self { decoder, options }
    }

    /// Name of the wrapped backend
    pub fn backend(&self) -> &'static str {
        self.decoder.name()
    }

    /// Handle one inbound message.
    ///
    /// Never panics: a panic anywhere in request handling becomes an error
    /// response, so the worker loop always answers and keeps serving.
    pub fn handle(&mut self, request: Request) -> Response {
        let op = request.name.clone();
        let backend = self.backend();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(request)))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                error!(backend, op = %op, message = %message, "request handler panicked");
                Err(WorkerError::HandlerPanicked(message))
            });
        match outcome {
            Ok(result) => Response::Result { result },
            Err(err) => {
                warn!(backend, op = %op, error = %err, "request failed");
                Response::error(&err)
            }
        }
    }

    fn dispatch(&mut self, request: Request) -> Result<Vec<DetectedBarcode>, WorkerError> {
        if request.name != DETECT {
            return Err(WorkerError::UnsupportedOperation(request.name));
        }
        let image = request.into_image()?;
        self.detect(&image)
    }

    /// Validate the image and run the decoder, with the inverted retry.
    pub fn detect(&mut self, image: &ImageData) -> Result<Vec<DetectedBarcode>, WorkerError> {
        image.validate(self.options.max_pixels)?;
        debug!(
            backend = self.backend(),
            width = image.width,
            height = image.height,
            "detect"
        );

        let luma = image.to_luma();
        let first = self.run_decoder(&luma);
        let retry = self.options.try_inverted
            && match &first {
                Ok(found) => found.is_empty(),
                Err(err) => err.is_undecodable(),
            };
        let mut barcodes = if retry {
            debug!(backend = self.backend(), "nothing decoded, retrying inverted");
            match self.run_decoder(&luma.inverted()) {
                Ok(found) if !found.is_empty() => found,
                Ok(_) => first?,
                // report the upright failure first when both passes failed
                Err(err) if err.is_undecodable() => first.and(Err(err))?,
                Err(err) => return Err(err),
            }
        } else {
            first?
        };

        dedup(&mut barcodes);
        debug!(backend = self.backend(), found = barcodes.len(), "detect finished");
        Ok(barcodes)
    }

    fn run_decoder(&mut self, luma: &LumaImage) -> Result<Vec<DetectedBarcode>, WorkerError> {
        let backend = self.decoder.name();
        let decoder = &mut self.decoder;
        match panic::catch_unwind(AssertUnwindSafe(|| decoder.detect(luma))) {
            Ok(Ok(barcodes)) => Ok(barcodes),
            Ok(Err(source)) => Err(WorkerError::Decoder { backend, source }),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(backend, message = %message, "decoder panicked");
                Err(WorkerError::DecoderPanicked { backend, message })
            }
        }
    }
}

/// Drop symbols reported twice with the same value at the same place.
fn dedup(barcodes: &mut Vec<DetectedBarcode>) {
    let mut kept: Vec<DetectedBarcode> = Vec::with_capacity(barcodes.len());
    for barcode in barcodes.drain(..) {
        let seen = kept.iter().any(|k| {
            k.raw_value == barcode.raw_value && k.corner_points == barcode.corner_points
        });
        if !seen {
            kept.push(barcode);
        }
    }
    *barcodes = kept;
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
