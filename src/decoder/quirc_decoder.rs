use quircs::{Data, DataType, Quirc};
use tracing::{debug, trace};

use super::text::{ECI_SHIFT_JIS, decode_payload};
use super::{Decoder, check_luma};
use crate::error::DecodeError;
use crate::models::{DetectedBarcode, LumaImage, Point};

/// Backend over `quircs`, a Rust port of the quirc library
///
/// The `Quirc` recognizer keeps its scratch buffers between frames, so one
/// instance is reused for the lifetime of the worker.
#[derive(Default)]
pub struct QuircDecoder {
    quirc: Quirc,
}

impl QuircDecoder {
    /// Create the decoder with an empty recognizer
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for QuircDecoder {
    fn name(&self) -> &'static str {
        "quirc"
    }

    fn detect(&mut self, image: &LumaImage) -> Result<Vec<DetectedBarcode>, DecodeError> {
        check_luma(image)?;

        let mut barcodes = Vec::new();
        let mut located = 0;
        let mut last_failure = None;
        let codes = self.quirc.identify(image.width, image.height, &image.data);
        for (idx, code) in codes.enumerate() {
            located += 1;
            let code = match code {
                Ok(code) => code,
                Err(err) => {
                    trace!(code = idx, error = %err, "quirc failed to extract code");
                    last_failure = Some(err.to_string());
                    continue;
                }
            };
            match code.decode() {
                Ok(data) => {
                    let corners = code.corners.map(|p| Point::from_i32(p.x, p.y));
                    let raw_value = decode_payload(&data.payload, charset_hint(&data));
                    debug!(code = idx, bytes = data.payload.len(), "quirc decoded symbol");
                    barcodes.push(DetectedBarcode::qr_code(raw_value, corners));
                }
                Err(err) => {
                    debug!(code = idx, error = %err, "quirc code failed to decode");
                    last_failure = Some(err.to_string());
                }
            }
        }

        match last_failure {
            Some(reason) if barcodes.is_empty() => Err(DecodeError::Undecodable { located, reason }),
            _ => Ok(barcodes),
        }
    }
}

/// ECI designator for the payload, if quirc saw one. Kanji segments are
/// written out as Shift_JIS, so they imply that charset.
fn charset_hint(data: &Data) -> Option<u32> {
    match (data.eci, data.data_type) {
        (Some(eci), _) => Some(eci as u32),
        (None, Some(DataType::Kanji)) => Some(ECI_SHIFT_JIS),
        (None, _) => None,
    }
}
