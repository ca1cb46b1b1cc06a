// SPDX-License-Identifier: MIT
//! JPEG/PNG serialization and the size-constrained quality search.
//!
//! Quality-mode and PNG encodes are single calls into the `image` codecs.
//! Filesize mode is a search problem: encoding is the expensive operation,
//! so the search spends as few encode calls as possible finding the highest
//! JPEG quality whose output still fits a byte budget. Encoded size is
//! treated as non-decreasing in quality; real encoders violate that locally,
//! and the search tolerates violations without looping or overshooting.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::buffer::PixelBuffer;

/// Maximum encode calls a budget search may spend, unless the caller picks
/// its own bound.
pub const DEFAULT_ITERATION_LIMIT: usize = 16;

// Descending probe ladder used to bracket the fit/no-fit transition before
// binary-searching inside the bracket.
const COARSE_QUALITIES: [u8; 5] = [100, 80, 60, 40, 20];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// One encode request. The format/mode combinations of the contract are the
/// only representable values; PNG carries no quality and a byte budget only
/// exists in JPEG filesize mode.
#[derive(Debug, Clone, Copy)]
pub enum EncodeRequest {
    /// Lossless PNG.
    Png,
    /// Single JPEG encode at an explicit quality (1-100).
    JpegQuality(u8),
    /// Highest JPEG quality whose output fits `max_bytes`, found within
    /// `iteration_limit` encode calls.
    JpegUnderBudget {
        max_bytes: usize,
        iteration_limit: usize,
    },
}

/// Encoded artifact plus the facts callers report to the user.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    /// Quality the final JPEG encode ran at; `None` for PNG.
    pub actual_quality: Option<u8>,
    pub size_bytes: usize,
}

#[derive(Debug)]
pub enum EncodeError {
    EmptyBuffer,
    ZeroDimension,
    Codec(image::ImageError),
}

impl From<image::ImageError> for EncodeError {
    fn from(e: image::ImageError) -> Self {
        Self::Codec(e)
    }
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::EmptyBuffer => write!(f, "pixel buffer is empty"),
            EncodeError::ZeroDimension => write!(f, "image dimensions are zero"),
            EncodeError::Codec(e) => write!(f, "codec error: {e}"),
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodeError::Codec(e) => Some(e),
            _ => None,
        }
    }
}

/// Serialize a pixel buffer per the request.
pub fn encode(buffer: &PixelBuffer, request: EncodeRequest) -> Result<EncodedImage, EncodeError> {
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(EncodeError::ZeroDimension);
    }
    if buffer.data().is_empty() {
        return Err(EncodeError::EmptyBuffer);
    }
    match request {
        EncodeRequest::Png => encode_png(buffer),
        EncodeRequest::JpegQuality(quality) => {
            let rgb = flatten_alpha(buffer);
            let bytes = encode_jpeg_rgb(&rgb, buffer.width(), buffer.height(), quality.clamp(1, 100))?;
            Ok(finish_jpeg(bytes, quality.clamp(1, 100)))
        }
        EncodeRequest::JpegUnderBudget {
            max_bytes,
            iteration_limit,
        } => encode_under_budget(buffer, max_bytes, iteration_limit),
    }
}

/// Find the highest JPEG quality in [1, 100] whose encoding fits `max_bytes`.
///
/// Never exceeds the budget when any quality fits; when even quality 1 is
/// over budget the quality-1 encoding is returned anyway, so a screenshot
/// save never fails on budget alone. At most `iteration_limit` encode calls
/// are spent.
pub fn encode_under_budget(
    buffer: &PixelBuffer,
    max_bytes: usize,
    iteration_limit: usize,
) -> Result<EncodedImage, EncodeError> {
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(EncodeError::ZeroDimension);
    }
    if buffer.data().is_empty() {
        return Err(EncodeError::EmptyBuffer);
    }
    // Flatten once; every probe reuses the RGB plane.
    let rgb = flatten_alpha(buffer);
    let (width, height) = (buffer.width(), buffer.height());
    let found = search_highest_fitting(
        |quality| encode_jpeg_rgb(&rgb, width, height, quality),
        max_bytes,
        iteration_limit,
    )?;
    Ok(finish_jpeg(found.bytes, found.quality))
}

struct QualityFit {
    quality: u8,
    bytes: Vec<u8>,
}

/// The search itself, generic over the probe so the call-count and budget
/// guarantees are testable against synthetic size curves.
///
/// Phase 1 walks the coarse ladder downward until a probe fits, keeping the
/// lowest-quality oversized result as a fallback. Phase 2 binary-searches
/// the bracket between the fitting probe and the smallest failing quality
/// above it. Every probe shrinks the bracket whatever its result, so a
/// locally non-monotonic size curve cannot loop the search; it can only
/// settle on a slightly conservative quality.
fn search_highest_fitting<F>(
    mut probe: F,
    max_bytes: usize,
    iteration_limit: usize,
) -> Result<QualityFit, EncodeError>
where
    F: FnMut(u8) -> Result<Vec<u8>, EncodeError>,
{
    let limit = iteration_limit.max(1);
    let mut calls = 0usize;

    let mut best: Option<QualityFit> = None;
    let mut oversized: Option<QualityFit> = None;
    // lowest quality known to exceed the budget
    let mut hi: u8 = 101;

    for &quality in COARSE_QUALITIES.iter() {
        if calls >= limit {
            break;
        }
        let bytes = probe(quality)?;
        calls += 1;
        if bytes.len() <= max_bytes {
            best = Some(QualityFit { quality, bytes });
            break;
        }
        hi = quality;
        oversized = Some(QualityFit { quality, bytes });
    }

    let mut best = match best {
        Some(fit) => fit,
        None => {
            // Nothing on the ladder fits. Try the floor if the call budget
            // allows, otherwise hand back the smallest thing seen.
            if calls >= limit {
                match oversized {
                    Some(fit) => return Ok(fit),
                    // limit >= 1 guarantees at least one probe ran
                    None => unreachable!("no probe executed within iteration limit"),
                }
            }
            let bytes = probe(1)?;
            calls += 1;
            let floor = QualityFit { quality: 1, bytes };
            if floor.bytes.len() > max_bytes {
                // Unsatisfiable budget: best effort, never fail the save.
                return Ok(floor);
            }
            floor
        }
    };

    // Binary search (best.quality, hi) for the highest fitting quality.
    while best.quality + 1 < hi && calls < limit {
        let mid = best.quality + (hi - best.quality) / 2;
        let bytes = probe(mid)?;
        calls += 1;
        if bytes.len() <= max_bytes {
            best = QualityFit { quality: mid, bytes };
        } else {
            hi = mid;
        }
    }

    Ok(best)
}

fn encode_png(buffer: &PixelBuffer) -> Result<EncodedImage, EncodeError> {
    let mut out = Vec::new();
    PngEncoder::new(Cursor::new(&mut out)).write_image(
        buffer.data(),
        buffer.width(),
        buffer.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(EncodedImage {
        size_bytes: out.len(),
        bytes: out,
        format: ImageFormat::Png,
        actual_quality: None,
    })
}

fn encode_jpeg_rgb(rgb: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(Cursor::new(&mut out), quality).write_image(
        rgb,
        width,
        height,
        ExtendedColorType::Rgb8,
    )?;
    Ok(out)
}

fn finish_jpeg(bytes: Vec<u8>, quality: u8) -> EncodedImage {
    EncodedImage {
        size_bytes: bytes.len(),
        bytes,
        format: ImageFormat::Jpeg,
        actual_quality: Some(quality),
    }
}

// JPEG carries no alpha channel; drop it.
fn flatten_alpha(buffer: &PixelBuffer) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(buffer.width() as usize * buffer.height() as usize * 3);
    for px in buffer.data().chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}
