// SPDX-License-Identifier: MIT
//! Pixel classification and banner boundary detection.
//!
//! A banner sitting on a known backdrop is located in two steps: a row-major
//! raster scan finds the first foreground pixel, then a down-then-right walk
//! from that seed infers the banner's bounding box. The walk deliberately
//! assumes the banner is a single axis-aligned rectangle whose top row starts
//! at its leftmost extent: it runs down the seed column to the last foreground
//! row, then runs right along THAT row (not the seed row) to the last
//! foreground column. This is O(height + width) instead of a full
//! connected-component scan, and is knowingly wrong for non-rectangular or
//! multi-region foregrounds. Do not upgrade it to a flood fill without
//! sign-off; callers depend on the observable behavior.

use crate::buffer::{BoundingBox, Color, PixelBuffer};

/// Alpha values at or below this are treated as invisible.
pub const ALPHA_VISIBLE_MIN: u8 = 25;

/// Default per-channel background-match tolerance. Some deployments run with
/// a tighter value of 1; the field on [`DetectionOptions`] covers both.
pub const DEFAULT_BG_TOLERANCE: u8 = 5;

/// Per-pass detection settings, constructed once per screenshot request and
/// immutable for the duration of the pass.
#[derive(Debug, Clone, Copy)]
pub struct DetectionOptions {
    /// Classify by alpha alone instead of by background-color proximity.
    pub is_transparent: bool,
    /// Backdrop color the banner is expected to sit on.
    pub background_color: Color,
    /// Strict per-channel tolerance for the background match.
    pub tolerance: u8,
    /// Physical-to-logical scale of the captured screenshot.
    pub device_pixel_ratio: f64,
    /// Render output at full device resolution instead of logical resolution.
    pub retina_mode_enabled: bool,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            is_transparent: false,
            background_color: Color::WHITE,
            tolerance: DEFAULT_BG_TOLERANCE,
            device_pixel_ratio: 1.0,
            retina_mode_enabled: false,
        }
    }
}

#[derive(Debug)]
pub enum DetectError {
    /// The whole image classified as background.
    NoForeground,
}

impl std::fmt::Display for DetectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectError::NoForeground => write!(f, "could not detect banner boundaries"),
        }
    }
}

impl std::error::Error for DetectError {}

/// Classify one pixel as banner foreground or backdrop.
///
/// Transparent mode: foreground iff visibly non-transparent. Color mode:
/// background iff all three channels sit within `tolerance` of the reference
/// color AND the pixel is visibly opaque; everything else, including
/// antialiased and semi-transparent edge pixels, counts as foreground.
///
/// Coordinates must lie inside the buffer.
#[inline]
pub fn is_foreground(buffer: &PixelBuffer, x: u32, y: u32, options: &DetectionOptions) -> bool {
    let [r, g, b, a] = buffer.rgba(x, y);
    if options.is_transparent {
        return a > ALPHA_VISIBLE_MIN;
    }
    let bg = options.background_color;
    let matches_background = bg.r.abs_diff(r) < options.tolerance
        && bg.g.abs_diff(g) < options.tolerance
        && bg.b.abs_diff(b) < options.tolerance
        && a > ALPHA_VISIBLE_MIN;
    !matches_background
}

/// Row-major raster scan from (0, 0); the first foreground pixel wins.
/// `Err(NoForeground)` means no banner is present anywhere in the buffer.
pub fn find_first_foreground(
    buffer: &PixelBuffer,
    options: &DetectionOptions,
) -> Result<(u32, u32), DetectError> {
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            if is_foreground(buffer, x, y, options) {
                return Ok((x, y));
            }
        }
    }
    Err(DetectError::NoForeground)
}

/// Infer the banner's bounding box from a foreground seed pixel.
///
/// Walks down column `seed.x` while pixels remain foreground, then right
/// along the last foreground row. Both walks stop at the buffer edge, so a
/// banner flush against the right or bottom border never causes an
/// out-of-bounds read.
///
/// The seed must be a foreground pixel (as produced by
/// [`find_first_foreground`]).
pub fn find_boundary(
    buffer: &PixelBuffer,
    seed: (u32, u32),
    options: &DetectionOptions,
) -> BoundingBox {
    let (seed_x, seed_y) = seed;

    let mut y1 = seed_y;
    while y1 < buffer.height() && is_foreground(buffer, seed_x, y1, options) {
        y1 += 1;
    }
    // last foreground row of the vertical run
    let bottom = y1.saturating_sub(1);

    let mut x2 = seed_x;
    while x2 < buffer.width() && is_foreground(buffer, x2, bottom, options) {
        x2 += 1;
    }

    BoundingBox {
        x: seed_x,
        y: seed_y,
        width: x2 - seed_x,
        height: bottom - seed_y + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: u32, height: u32, color: Color) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[color.r, color.g, color.b, 255]);
        }
        PixelBuffer::new(width, height, data).unwrap()
    }

    fn paint_rect(buffer: &mut Vec<u8>, width: u32, rect: BoundingBox, color: Color) {
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                let start = ((y * width + x) * 4) as usize;
                buffer[start] = color.r;
                buffer[start + 1] = color.g;
                buffer[start + 2] = color.b;
                buffer[start + 3] = 255;
            }
        }
    }

    fn white_with_gray_rect(width: u32, height: u32, rect: BoundingBox) -> PixelBuffer {
        let mut data = uniform(width, height, Color::WHITE).into_data();
        paint_rect(
            &mut data,
            width,
            rect,
            Color {
                r: 128,
                g: 128,
                b: 128,
            },
        );
        PixelBuffer::new(width, height, data).unwrap()
    }

    #[test]
    fn uniform_background_has_no_foreground() {
        let buf = uniform(64, 48, Color::WHITE);
        let opts = DetectionOptions::default();
        assert!(matches!(
            find_first_foreground(&buf, &opts),
            Err(DetectError::NoForeground)
        ));
    }

    #[test]
    fn near_background_pixels_stay_background_within_tolerance() {
        let buf = uniform(
            8,
            8,
            Color {
                r: 252,
                g: 253,
                b: 251,
            },
        );
        let opts = DetectionOptions::default();
        assert!(find_first_foreground(&buf, &opts).is_err());

        let tight = DetectionOptions {
            tolerance: 1,
            ..opts
        };
        assert_eq!(find_first_foreground(&buf, &tight).unwrap(), (0, 0));
    }

    #[test]
    fn semi_transparent_pixel_is_foreground_in_color_mode() {
        let mut data = uniform(4, 4, Color::WHITE).into_data();
        // white but nearly transparent: fails the opacity half of the
        // background test, so it classifies as foreground
        data[3] = 10;
        let buf = PixelBuffer::new(4, 4, data).unwrap();
        let opts = DetectionOptions::default();
        assert_eq!(find_first_foreground(&buf, &opts).unwrap(), (0, 0));
    }

    #[test]
    fn transparent_mode_uses_alpha_threshold() {
        let mut data = vec![0u8; 4 * 4 * 4];
        let idx = ((1 * 4 + 2) * 4) as usize;
        data[idx + 3] = 26; // just above the visibility threshold
        let buf = PixelBuffer::new(4, 4, data).unwrap();
        let opts = DetectionOptions {
            is_transparent: true,
            ..DetectionOptions::default()
        };
        assert_eq!(find_first_foreground(&buf, &opts).unwrap(), (2, 1));

        let mut faint = vec![0u8; 4 * 4 * 4];
        faint[idx + 3] = 25; // at the threshold: still invisible
        let buf = PixelBuffer::new(4, 4, faint).unwrap();
        assert!(find_first_foreground(&buf, &opts).is_err());
    }

    #[test]
    fn boundary_of_solid_rectangle_is_exact() {
        let rect = BoundingBox {
            x: 10,
            y: 5,
            width: 30,
            height: 12,
        };
        let buf = white_with_gray_rect(64, 32, rect);
        let opts = DetectionOptions::default();
        let seed = find_first_foreground(&buf, &opts).unwrap();
        assert_eq!(seed, (10, 5));
        assert_eq!(find_boundary(&buf, seed, &opts), rect);
    }

    #[test]
    fn boundary_scans_stop_at_buffer_edges() {
        // rectangle flush against the bottom-right corner: both walks hit
        // the lenient one-past-end bound and must clamp
        let rect = BoundingBox {
            x: 20,
            y: 8,
            width: 12,
            height: 8,
        };
        let buf = white_with_gray_rect(32, 16, rect);
        let opts = DetectionOptions::default();
        let seed = find_first_foreground(&buf, &opts).unwrap();
        assert_eq!(find_boundary(&buf, seed, &opts), rect);
    }

    #[test]
    fn horizontal_scan_runs_along_bottom_row_of_vertical_run() {
        // L-shape: tall narrow column with a wide foot. The scan measures
        // width at the foot row, so the reported box spans the foot's width
        // from the seed even though the seed row is narrower.
        let mut data = uniform(40, 20, Color::WHITE).into_data();
        let ink = Color { r: 0, g: 0, b: 0 };
        paint_rect(
            &mut data,
            40,
            BoundingBox {
                x: 4,
                y: 2,
                width: 3,
                height: 10,
            },
            ink,
        );
        paint_rect(
            &mut data,
            40,
            BoundingBox {
                x: 4,
                y: 11,
                width: 20,
                height: 1,
            },
            ink,
        );
        let buf = PixelBuffer::new(40, 20, data).unwrap();
        let opts = DetectionOptions::default();
        let seed = find_first_foreground(&buf, &opts).unwrap();
        assert_eq!(seed, (4, 2));
        let bbox = find_boundary(&buf, seed, &opts);
        assert_eq!(
            bbox,
            BoundingBox {
                x: 4,
                y: 2,
                width: 20,
                height: 10
            }
        );
    }
}
