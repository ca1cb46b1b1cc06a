// SPDX-License-Identifier: MIT
// Physical (device) <-> logical (CSS) pixel mapping.
//
// Screenshots are always captured at the physical resolution, but crop
// coordinates must be expressed in logical pixels to line up with DOM
// measurements and user-specified dimensions. Output resolution is a
// separate concern: retina mode re-applies the device ratio at render time.

use crate::buffer::BoundingBox;

/// Rescale a physical-space box into logical pixels.
///
/// For ratios above 1 every field is divided and rounded up, so a box that
/// covers a fractional logical pixel still covers it after mapping. Ratio 1
/// (or anything at or below it) is the identity.
pub fn to_logical(bbox: &BoundingBox, device_pixel_ratio: f64) -> BoundingBox {
    if device_pixel_ratio > 1.0 {
        let up = |v: u32| (v as f64 / device_pixel_ratio).ceil() as u32;
        BoundingBox {
            x: up(bbox.x),
            y: up(bbox.y),
            width: up(bbox.width),
            height: up(bbox.height),
        }
    } else {
        *bbox
    }
}

/// Rescale a logical-space box back up to physical coordinates as an
/// `(x, y, width, height)` rectangle. Fractional ratios produce fractional
/// rectangles; the cropper samples them directly.
pub fn to_physical(bbox: &BoundingBox, device_pixel_ratio: f64) -> (f64, f64, f64, f64) {
    (
        bbox.x as f64 * device_pixel_ratio,
        bbox.y as f64 * device_pixel_ratio,
        bbox.width as f64 * device_pixel_ratio,
        bbox.height as f64 * device_pixel_ratio,
    )
}

/// Scale at which the final output image is rendered: the device ratio when
/// retina mode is on, logical resolution otherwise.
pub fn effective_output_ratio(retina_mode_enabled: bool, device_pixel_ratio: f64) -> f64 {
    if retina_mode_enabled {
        device_pixel_ratio
    } else {
        1.0
    }
}
