// SPDX-License-Identifier: MIT
//! # banner-core: Banner Detection and Size-Constrained Encoding
//!
//! The pixel engine behind the banner capture tool: given a raw RGBA
//! screenshot buffer, locate the rectangular banner region sitting on a
//! known backdrop, crop it with retina-aware coordinate mapping, and
//! serialize it to PNG or JPEG under either a fixed quality or a byte
//! budget.
//!
//! ## Architecture Overview
//!
//! The crate is a chain of small, synchronous stages:
//! 1. [`detect`]: classify pixels and walk out the banner's bounding box
//! 2. [`coords`]: map between physical (device) and logical (CSS) pixels
//! 3. [`crop`]: resample the region to the output resolution
//! 4. [`encode`]: PNG/JPEG serialization and the quality-vs-size search
//!
//! [`buffer`] holds the shared data types ([`buffer::PixelBuffer`],
//! [`buffer::Color`], [`buffer::BoundingBox`]).
//!
//! ## Design Constraints
//!
//! - **No hidden state**: every pass takes explicit option structs; nothing
//!   is cached between screenshots.
//! - **Exact detection semantics**: the boundary walk is a rectangle-
//!   assuming down-then-right scan, measuring width at the bottom row of
//!   the vertical run. It is O(height + width), not a flood fill, and
//!   callers depend on that exact behavior.
//! - **Bounded encode cost**: filesize mode never spends more than its
//!   iteration limit in encode calls, and degrades to the quality-1 result
//!   rather than failing when the budget is unsatisfiable.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use banner_core::buffer::PixelBuffer;
//! use banner_core::detect::{self, DetectionOptions};
//! use banner_core::{coords, crop, encode};
//!
//! # fn run(screenshot: PixelBuffer) -> Result<(), Box<dyn std::error::Error>> {
//! let options = DetectionOptions {
//!     device_pixel_ratio: 2.0,
//!     ..DetectionOptions::default()
//! };
//!
//! let seed = detect::find_first_foreground(&screenshot, &options)?;
//! let physical = detect::find_boundary(&screenshot, seed, &options);
//! let logical = coords::to_logical(&physical, options.device_pixel_ratio);
//!
//! let ratio = coords::effective_output_ratio(
//!     options.retina_mode_enabled,
//!     options.device_pixel_ratio,
//! );
//! let mut resizer = fast_image_resize::Resizer::new();
//! let cropped = crop::crop_rgba_cpu(
//!     &mut resizer,
//!     &screenshot,
//!     &logical,
//!     options.device_pixel_ratio,
//!     ratio,
//! )?;
//!
//! let banner = encode::encode_under_budget(&cropped, 39_000, encode::DEFAULT_ITERATION_LIMIT)?;
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod coords;
pub mod crop;
pub mod detect;
pub mod encode;
