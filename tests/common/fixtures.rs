//! Test fixtures for integration tests.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use roomlens::embedding::MockEmbedder;

pub const KITCHEN_PROMPT: &str = "modern kitchen, sage green cabinets, pendant lighting";

pub const KITCHEN_SCORE: f32 = 0.4632;

/// Mock embedder with fixed similarities for [`KITCHEN_PROMPT`] and its features.
pub fn kitchen_embedder() -> MockEmbedder {
    MockEmbedder::new()
        .with_similarity(KITCHEN_PROMPT, KITCHEN_SCORE)
        .with_similarity("modern kitchen", 0.62)
        .with_similarity("sage green cabinets", 0.31)
        .with_similarity("pendant lighting", 0.12)
}

/// A small solid-colour PNG.
pub fn png_bytes(color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(16, 16, Rgb(color));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("Failed to encode PNG");
    buf
}
