pub mod barcode;
pub mod image_data;
pub mod point;

pub use barcode::{BarcodeFormat, BoundingBox, DetectedBarcode};
pub use image_data::{ImageData, LumaImage};
pub use point::Point;
