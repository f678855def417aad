//! Synthetic QR fixtures rendered at test time.

#![allow(dead_code)]

use image::{Rgba, RgbaImage, imageops};
use qr_workers::ImageData;
use qrcode_generator::QrCodeEcc;

const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Render `text` with `scale` pixels per module and a 4-module quiet zone.
pub fn render(text: &str, scale: u32) -> RgbaImage {
    render_bytes(text.as_bytes(), scale)
}

/// Render a raw payload. Bytes that are not UTF-8 go out in byte mode
/// without an ECI designator.
pub fn render_bytes(payload: &[u8], scale: u32) -> RgbaImage {
    paint(&matrix(payload), scale)
}

/// Render `text`, then flip every module below and right of the format strips.
///
/// Finder, timing, format and alignment patterns are left intact, so
/// decoders still locate the symbol but error correction cannot recover it.
pub fn corrupted(text: &str, scale: u32) -> RgbaImage {
    let mut matrix = matrix(text.as_bytes());
    let modules = matrix.len();
    let alignment = modules.saturating_sub(9)..=modules.saturating_sub(5);
    for y in 9..modules {
        for x in 9..modules {
            if alignment.contains(&x) && alignment.contains(&y) {
                continue;
            }
            matrix[y][x] = !matrix[y][x];
        }
    }
    paint(&matrix, scale)
}

fn matrix(payload: &[u8]) -> Vec<Vec<bool>> {
    qrcode_generator::to_matrix(payload, QrCodeEcc::Medium).expect("encode QR")
}

fn paint(matrix: &[Vec<bool>], scale: u32) -> RgbaImage {
    let modules = matrix.len() as u32;
    let quiet = 4;
    let side = (modules + 2 * quiet) * scale;

    RgbaImage::from_fn(side, side, |x, y| {
        let mx = (x / scale) as i64 - quiet as i64;
        let my = (y / scale) as i64 - quiet as i64;
        let inside = (0..modules as i64).contains(&mx) && (0..modules as i64).contains(&my);
        if inside && matrix[my as usize][mx as usize] {
            DARK
        } else {
            LIGHT
        }
    })
}

/// Light modules on a dark background
pub fn inverted(mut img: RgbaImage) -> RgbaImage {
    imageops::invert(&mut img);
    img
}

/// Quarter turn clockwise
pub fn rotated(img: &RgbaImage) -> RgbaImage {
    imageops::rotate90(img)
}

/// Gaussian blur
pub fn blurred(img: &RgbaImage, sigma: f32) -> RgbaImage {
    imageops::blur(img, sigma)
}

/// Paste the symbol off-center onto a larger grey canvas
pub fn on_canvas(img: &RgbaImage, width: u32, height: u32, x: i64, y: i64) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([180, 180, 180, 255]));
    imageops::overlay(&mut canvas, img, x, y);
    canvas
}

/// Convert into the request payload
pub fn image_data(img: RgbaImage) -> ImageData {
    let (width, height) = img.dimensions();
    ImageData::new(img.into_raw(), width, height)
}
