//! Pixel helpers shared by the decoder backends
//!
//! - Grayscale conversion (RGBA to luminance, sequential and rayon row-parallel)
//! - Inversion for light-on-dark symbols

pub mod grayscale;
