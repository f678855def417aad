use serde::{Deserialize, Serialize};

use super::Point;

/// Symbology of a detected barcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeFormat {
    /// Model 2 QR code
    QrCode,
}

/// Axis-aligned rectangle around a symbol, shaped like `DOMRectReadOnly`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
    /// Same as `y`
    pub top: f32,
    /// `x + width`
    pub right: f32,
    /// `y + height`
    pub bottom: f32,
    /// Same as `x`
    pub left: f32,
}

impl BoundingBox {
    /// Rectangle from its left/top corner and size
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            x: left,
            y: top,
            width,
            height,
            top,
            right: left + width,
            bottom: top + height,
            left,
        }
    }

    /// Smallest rectangle that encloses every point
    pub fn enclosing(points: &[Point]) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// One decoded symbol in a `result` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedBarcode {
    /// Decoded text payload
    pub raw_value: String,
    /// Symbology
    pub format: BarcodeFormat,
    /// Corners clockwise from the symbol's top-left
    pub corner_points: [Point; 4],
    /// Box enclosing `corner_points`
    pub bounding_box: BoundingBox,
}

impl DetectedBarcode {
    /// Build a QR code result; the bounding box is derived from the corners.
    pub fn qr_code(raw_value: String, corner_points: [Point; 4]) -> Self {
        Self {
            raw_value,
            format: BarcodeFormat::QrCode,
            bounding_box: BoundingBox::enclosing(&corner_points),
            corner_points,
        }
    }
}
