//! Shared fixtures for the integration test suites.

use banner_core::buffer::{BoundingBox, Color, PixelBuffer};
use image::{DynamicImage, RgbaImage};

/// Uniform background buffer.
pub fn uniform_buffer(width: u32, height: u32, color: Color) -> PixelBuffer {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        data.extend_from_slice(&[color.r, color.g, color.b, 255]);
    }
    PixelBuffer::new(width, height, data).unwrap()
}

/// White background with one solid rectangle painted on it.
pub fn buffer_with_banner(
    width: u32,
    height: u32,
    banner: BoundingBox,
    banner_color: Color,
) -> PixelBuffer {
    let mut data = uniform_buffer(width, height, Color::WHITE).into_data();
    for y in banner.y..banner.y + banner.height {
        for x in banner.x..banner.x + banner.width {
            let start = ((y * width + x) * 4) as usize;
            data[start] = banner_color.r;
            data[start + 1] = banner_color.g;
            data[start + 2] = banner_color.b;
            data[start + 3] = 255;
        }
    }
    PixelBuffer::new(width, height, data).unwrap()
}

/// Same fixture as a decodable image, for session-level entry points.
pub fn screenshot_with_banner(
    width: u32,
    height: u32,
    banner: BoundingBox,
    banner_color: Color,
) -> DynamicImage {
    let buffer = buffer_with_banner(width, height, banner, banner_color);
    let (w, h) = (buffer.width(), buffer.height());
    DynamicImage::ImageRgba8(RgbaImage::from_raw(w, h, buffer.into_data()).unwrap())
}

pub const GRAY: Color = Color {
    r: 128,
    g: 128,
    b: 128,
};
