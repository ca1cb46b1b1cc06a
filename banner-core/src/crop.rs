// SPDX-License-Identifier: MIT
// CPU cropper/rescaler built on fast_image_resize (SIMD-accelerated).
// RGBA8 in → RGBA8 out, rendered at the requested output ratio.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{ResizeOptions, Resizer};

use crate::buffer::{BoundingBox, BufferError, PixelBuffer, BYTES_PER_PIXEL};
use crate::coords;

#[derive(Debug)]
pub enum CropError {
    /// The requested region has no area after clamping to the source.
    EmptyRegion,
    Buffer(BufferError),
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
}

impl From<BufferError> for CropError {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}
impl From<fir::ResizeError> for CropError {
    fn from(e: fir::ResizeError) -> Self {
        Self::Fir(e)
    }
}
impl From<fir::ImageBufferError> for CropError {
    fn from(e: fir::ImageBufferError) -> Self {
        Self::ImageBuf(e)
    }
}

impl std::fmt::Display for CropError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CropError::EmptyRegion => write!(f, "crop region is empty"),
            CropError::Buffer(e) => write!(f, "pixel buffer error: {e}"),
            CropError::Fir(e) => write!(f, "resize error: {e}"),
            CropError::ImageBuf(e) => write!(f, "image buffer error: {e}"),
        }
    }
}

impl std::error::Error for CropError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CropError::Buffer(e) => Some(e),
            CropError::Fir(e) => Some(e),
            CropError::ImageBuf(e) => Some(e),
            CropError::EmptyRegion => None,
        }
    }
}

/// Crop `logical` out of a physical-resolution source and render it at
/// `output_ratio`.
///
/// The source rectangle is read at physical coordinates
/// (`logical * device_pixel_ratio`, fractional rectangles allowed) and
/// clamped to the source dimensions, so reads never go out of bounds. The
/// destination measures `round(logical.width * output_ratio)` by
/// `round(logical.height * output_ratio)`, at least 1x1.
///
/// When both ratios are 1 the result is a bit-exact copy of the source
/// rectangle; otherwise the region is resampled with a bilinear convolution
/// (deterministic, alpha not premultiplied).
pub fn crop_rgba_cpu(
    resizer: &mut Resizer,
    source: &PixelBuffer,
    logical: &BoundingBox,
    device_pixel_ratio: f64,
    output_ratio: f64,
) -> Result<PixelBuffer, CropError> {
    if logical.width == 0 || logical.height == 0 {
        return Err(CropError::EmptyRegion);
    }

    if device_pixel_ratio == 1.0 && output_ratio == 1.0 {
        let clamped = logical.clamp_to(source.width(), source.height());
        if clamped.width == 0 || clamped.height == 0 {
            return Err(CropError::EmptyRegion);
        }
        return copy_region(source, &clamped);
    }

    // --- Fractional source rectangle, clamped to the buffer ---
    let (left, top, width, height) = coords::to_physical(logical, device_pixel_ratio);
    let src_w = source.width() as f64;
    let src_h = source.height() as f64;
    let left = left.clamp(0.0, src_w);
    let top = top.clamp(0.0, src_h);
    let width = width.min(src_w - left);
    let height = height.min(src_h - top);
    if width <= 0.0 || height <= 0.0 {
        return Err(CropError::EmptyRegion);
    }

    let dst_w = ((logical.width as f64 * output_ratio).round() as u32).max(1);
    let dst_h = ((logical.height as f64 * output_ratio).round() as u32).max(1);
    let mut dst = vec![0u8; dst_w as usize * dst_h as usize * BYTES_PER_PIXEL];

    let src_view = TypedImageRef::<U8x4>::from_buffer(source.width(), source.height(), source.data())?;
    let mut dst_image = TypedImage::<U8x4>::from_buffer(dst_w, dst_h, &mut dst)?;

    let opts = ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Bilinear))
        .crop(left, top, width, height)
        .use_alpha(false);
    resizer.resize_typed::<U8x4>(&src_view, &mut dst_image, &opts)?;

    Ok(PixelBuffer::new(dst_w, dst_h, dst)?)
}

// Row-by-row copy for the 1:1 path; output must be bit-identical to the
// source rectangle.
fn copy_region(source: &PixelBuffer, region: &BoundingBox) -> Result<PixelBuffer, CropError> {
    let src_row_bytes = source.width() as usize * BYTES_PER_PIXEL;
    let dst_row_bytes = region.width as usize * BYTES_PER_PIXEL;
    let mut dst = Vec::with_capacity(dst_row_bytes * region.height as usize);
    for row in region.y..region.y + region.height {
        let start = row as usize * src_row_bytes + region.x as usize * BYTES_PER_PIXEL;
        dst.extend_from_slice(&source.data()[start..start + dst_row_bytes]);
    }
    Ok(PixelBuffer::new(region.width, region.height, dst)?)
}
