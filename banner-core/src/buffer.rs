// SPDX-License-Identifier: MIT
// Raw RGBA pixel buffers and the geometry types shared across the crate.

use image::RgbaImage;

/// Bytes per pixel for interleaved RGBA data.
pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug)]
pub enum BufferError {
    /// Buffer length does not equal `width * height * 4`.
    LengthMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::LengthMismatch { expected, actual } => {
                write!(f, "pixel buffer length {actual} does not match expected {expected}")
            }
        }
    }
}

impl std::error::Error for BufferError {}

/// Tightly packed RGBA8 pixel buffer, row-major, origin top-left.
///
/// The length invariant (`data.len() == width * height * 4`) is enforced at
/// construction so every accessor can index without re-checking it.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap an owned RGBA byte vector, validating the length invariant.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(BufferError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Take ownership of a decoded [`image::RgbaImage`]; its layout already
    /// satisfies the length invariant.
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// RGBA channels at (x, y). Caller must keep coordinates in range.
    #[inline]
    pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        debug_assert!(x < self.width && y < self.height);
        let start = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        [
            self.data[start],
            self.data[start + 1],
            self.data[start + 2],
            self.data[start + 3],
        ]
    }
}

/// Reference background color used for edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Parse `#rrggbb`, `rrggbb` or the short `#rgb` form.
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let parse = |chunk: &str| u8::from_str_radix(chunk, 16);
        match hex.len() {
            6 => Ok(Color {
                r: parse(&hex[0..2]).map_err(|_| ColorParseError::bad(s))?,
                g: parse(&hex[2..4]).map_err(|_| ColorParseError::bad(s))?,
                b: parse(&hex[4..6]).map_err(|_| ColorParseError::bad(s))?,
            }),
            3 => {
                // #abc expands to #aabbcc
                let wide = |chunk: &str| parse(chunk).map(|v| v * 16 + v);
                Ok(Color {
                    r: wide(&hex[0..1]).map_err(|_| ColorParseError::bad(s))?,
                    g: wide(&hex[1..2]).map_err(|_| ColorParseError::bad(s))?,
                    b: wide(&hex[2..3]).map_err(|_| ColorParseError::bad(s))?,
                })
            }
            _ => Err(ColorParseError::bad(s)),
        }
    }
}

#[derive(Debug)]
pub struct ColorParseError {
    pub input: String,
}

impl ColorParseError {
    fn bad(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid color '{}', expected #rrggbb", self.input)
    }
}

impl std::error::Error for ColorParseError {}

/// Axis-aligned crop region in some consistent pixel space. Callers track
/// whether the coordinates are physical (device) or logical (CSS) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Clamp the box so it lies entirely within `width x height`.
    pub fn clamp_to(&self, width: u32, height: u32) -> BoundingBox {
        let x = self.x.min(width);
        let y = self.y.min(height);
        BoundingBox {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        }
    }
}
