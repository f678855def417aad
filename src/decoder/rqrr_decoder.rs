use rqrr::PreparedImage;
use tracing::{debug, trace};

use super::text::decode_payload;
use super::{Decoder, check_luma};
use crate::error::DecodeError;
use crate::models::{DetectedBarcode, LumaImage, Point};

/// Backend over `rqrr`, a pure Rust QR locator and decoder
///
/// Stateless: every frame gets a fresh `PreparedImage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    /// Create the decoder
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for RqrrDecoder {
    fn name(&self) -> &'static str {
        "rqrr"
    }

    fn detect(&mut self, image: &LumaImage) -> Result<Vec<DetectedBarcode>, DecodeError> {
        check_luma(image)?;

        let mut prepared =
            PreparedImage::prepare_from_greyscale(image.width, image.height, |x, y| image.get(x, y));
        let grids = prepared.detect_grids();
        trace!(grids = grids.len(), "rqrr located grids");

        let mut barcodes = Vec::with_capacity(grids.len());
        let mut last_failure = None;
        for (idx, grid) in grids.iter().enumerate() {
            let mut payload = Vec::new();
            match grid.decode_to(&mut payload) {
                Ok(_) => {
                    let corners = grid.bounds.map(|p| Point::from_i32(p.x, p.y));
                    // rqrr skips ECI segments without reporting them
                    let raw_value = decode_payload(&payload, None);
                    debug!(grid = idx, bytes = payload.len(), "rqrr decoded symbol");
                    barcodes.push(DetectedBarcode::qr_code(raw_value, corners));
                }
                Err(err) => {
                    debug!(grid = idx, error = %err, "rqrr grid failed to decode");
                    last_failure = Some(err.to_string());
                }
            }
        }

        match last_failure {
            Some(reason) if barcodes.is_empty() => Err(DecodeError::Undecodable {
                located: grids.len(),
                reason,
            }),
            _ => Ok(barcodes),
        }
    }
}
