//! Error types for the worker, its decoders and its input validation.

use std::time::Duration;

use thiserror::Error;

/// Reasons an `ImageData` argument is rejected before decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("image has zero width or height ({width}x{height})")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("pixel buffer holds {actual} bytes, expected {expected} for a {width}x{height} RGBA image")]
    BufferLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("image of {pixels} pixels exceeds the limit of {limit}")]
    TooLarge { pixels: usize, limit: usize },
}

/// Failure reported by a decoder backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("luminance buffer holds {actual} bytes, expected {expected}")]
    BufferMismatch { expected: usize, actual: usize },

    /// Symbols were located in the frame but none of them decoded
    #[error("located {located} symbol(s) but none decoded: {reason}")]
    Undecodable { located: usize, reason: String },

    #[error("{0}")]
    Backend(String),
}

/// Everything a worker request can fail with
///
/// Adapter-side variants travel back to the caller as the `message` of an
/// `error` response; the caller-side variants never cross the channel.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("missing image argument")]
    MissingImage,

    #[error("invalid argument: expected image data, got {0}")]
    InvalidArgument(String),

    #[error("invalid image: {0}")]
    InvalidImage(#[from] ImageError),

    #[error("{backend} decoder failed: {source}")]
    Decoder {
        backend: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error("{backend} decoder panicked: {message}")]
    DecoderPanicked {
        backend: &'static str,
        message: String,
    },

    #[error("request handler panicked: {0}")]
    HandlerPanicked(String),

    /// `error` response received from a worker
    #[error("{0}")]
    Remote(String),

    #[error("worker mailbox is closed")]
    MailboxClosed,

    #[error("worker stopped before replying")]
    WorkerStopped,

    #[error("worker did not reply within {0:?}")]
    Timeout(Duration),
}

impl WorkerError {
    /// True when the decoder saw a symbol it could not read
    pub fn is_undecodable(&self) -> bool {
        matches!(
            self,
            WorkerError::Decoder {
                source: DecodeError::Undecodable { .. },
                ..
            }
        )
    }
}
