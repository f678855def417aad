//! QR decoding backends
//!
//! The symbol locating and bit decoding live in external crates; this module
//! adapts each one to the [`Decoder`] trait:
//! - `rqrr` (pure Rust grid detector and decoder)
//! - `quircs` (port of the quirc C library)
//! - Payload text decoding shared by both (UTF-8, Shift_JIS, Latin-1)

use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;
use crate::models::{DetectedBarcode, LumaImage};

/// quirc-based backend
pub mod quirc_decoder;
/// rqrr-based backend
pub mod rqrr_decoder;
/// Payload bytes to text
pub mod text;

pub use quirc_decoder::QuircDecoder;
pub use rqrr_decoder::RqrrDecoder;

/// A QR decoding library wrapped behind a single capability.
///
/// A frame without any decodable symbol is `Ok(vec![])`. `Err` is reserved
/// for failures of the backend itself.
pub trait Decoder: Send {
    /// Short backend name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Locate and decode every QR symbol in the image
    fn detect(&mut self, image: &LumaImage) -> Result<Vec<DetectedBarcode>, DecodeError>;
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn detect(&mut self, image: &LumaImage) -> Result<Vec<DetectedBarcode>, DecodeError> {
        (**self).detect(image)
    }
}

/// Reject luminance buffers whose length disagrees with the dimensions.
pub(crate) fn check_luma(image: &LumaImage) -> Result<(), DecodeError> {
    let expected = image.width.saturating_mul(image.height);
    if image.data.len() != expected {
        return Err(DecodeError::BufferMismatch {
            expected,
            actual: image.data.len(),
        });
    }
    Ok(())
}

/// Available decoder backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// [`RqrrDecoder`]
    #[default]
    Rqrr,
    /// [`QuircDecoder`]
    Quirc,
}

impl Backend {
    /// Every backend, in a stable order
    pub const ALL: [Backend; 2] = [Backend::Rqrr, Backend::Quirc];

    /// Name accepted by [`Backend::from_str`]
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Rqrr => "rqrr",
            Backend::Quirc => "quirc",
        }
    }

    /// Fresh decoder instance for this backend
    pub fn decoder(&self) -> Box<dyn Decoder> {
        match self {
            Backend::Rqrr => Box::new(RqrrDecoder::new()),
            Backend::Quirc => Box::new(QuircDecoder::new()),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rqrr" | "jsqr" => Ok(Backend::Rqrr),
            "quirc" | "quircs" => Ok(Backend::Quirc),
            other => Err(format!("unknown backend `{other}` (expected rqrr or quirc)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_round_trip_names() {
        for backend in Backend::ALL {
            assert_eq!(backend.as_str().parse::<Backend>(), Ok(backend));
            assert_eq!(backend.decoder().name(), backend.as_str());
        }
        assert_eq!(" Quirc ".parse::<Backend>(), Ok(Backend::Quirc));
        assert!("zxing".parse::<Backend>().is_err());
    }

    #[test]
    fn test_check_luma() {
        let image = LumaImage {
            data: vec![0; 5],
            width: 2,
            height: 3,
        };
        assert_eq!(
            check_luma(&image),
            Err(DecodeError::BufferMismatch {
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_blank_frame_is_empty_success() {
        let image = LumaImage {
            data: vec![255; 64 * 64],
            width: 64,
            height: 64,
        };
        for backend in Backend::ALL {
            let codes = backend.decoder().detect(&image).unwrap();
            assert!(codes.is_empty(), "{backend} found codes in a blank frame");
        }
    }
}
