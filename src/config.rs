//! # Configuration Module
//!
//! Persisted options for banner capture, validation, and conversion into the
//! per-request option bundle handed to the processing session.
//!
//! ## Overview
//!
//! `SnapshotConfig` mirrors the options JSON the capture tool persists
//! between runs (field names stay camelCase for compatibility with existing
//! options files). The configuration system is designed to be:
//! - **Validated**: runtime validation with field-level error messages
//! - **Serializable**: JSON load/save round-trips through serde
//! - **Explicit**: converted into immutable per-request value objects, so
//!   nothing in the pipeline reads global state
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Range | Description |
//! |-----------|------|-------|-------------|
//! | `outputMode` | `JPG`/`PNG` | — | Encoded output format |
//! | `optimizingMode` | `quality`/`filesize` | — | JPEG optimization target |
//! | `quality` | `u8` | 1-100 | JPEG quality (quality mode) |
//! | `maxFileSize` | `u32` | >= 1 | Target size in KB (filesize mode) |
//! | `width`/`height` | `u32` | — | Fixed crop size; 0 means auto-detect |
//! | `backgroundColor` | hex string | — | Backdrop color for detection |
//! | `isTransparent` | `bool` | — | Detect against transparency instead |
//! | `tolerance` | `u8` | >= 1 | Per-channel background match tolerance |
//! | `devicePixelRatio` | `f64` | > 0 | Physical/logical pixel scale |
//! | `retinaMode` | `bool` | — | Output at device resolution |
//! | `suggestedFileName` | `String` | — | Explicit file name (no extension) |
//! | `overwrite` | `bool` | — | Replace an existing file of the same name |

use serde::{Deserialize, Serialize};
use std::path::Path;

use banner_core::buffer::Color;
use banner_core::detect::DetectionOptions;
use banner_core::encode::{EncodeRequest, ImageFormat, DEFAULT_ITERATION_LIMIT};

use crate::error::{SnapshotError, SnapshotResult};
use crate::output::FileNamePolicy;
use crate::{DetectionMode, SnapshotOptions};

/// Encoded output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    #[serde(rename = "JPG")]
    Jpg,
    #[serde(rename = "PNG")]
    Png,
}

impl OutputMode {
    pub fn format(&self) -> ImageFormat {
        match self {
            OutputMode::Jpg => ImageFormat::Jpeg,
            OutputMode::Png => ImageFormat::Png,
        }
    }
}

/// JPEG optimization target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizingMode {
    /// Encode once at a fixed quality.
    Quality,
    /// Search for the highest quality that fits a byte budget.
    Filesize,
}

/// Persisted capture options.
///
/// Defaults match the tool's stock deployment: JPEG at quality 90,
/// 39 KB budget when filesize mode is selected, automatic boundary
/// detection on a white backdrop, logical-resolution output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapshotConfig {
    pub output_mode: OutputMode,
    pub optimizing_mode: OptimizingMode,
    pub quality: u8,
    /// Target file size in KB (decimal: 1 KB = 1000 bytes).
    pub max_file_size: u32,
    /// Fixed crop width in logical pixels; 0 requests auto-detection.
    pub width: u32,
    /// Fixed crop height in logical pixels; 0 requests auto-detection.
    pub height: u32,
    pub is_transparent: bool,
    pub background_color: String,
    pub tolerance: u8,
    pub device_pixel_ratio: f64,
    pub retina_mode: bool,
    pub suggested_file_name: String,
    pub suggested_file_name_default: String,
    pub overwrite: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            output_mode: OutputMode::Jpg,
            optimizing_mode: OptimizingMode::Quality,
            quality: 90,
            max_file_size: 39,
            width: 0,
            height: 0,
            is_transparent: false,
            background_color: "#ffffff".to_string(),
            tolerance: banner_core::detect::DEFAULT_BG_TOLERANCE,
            device_pixel_ratio: 1.0,
            retina_mode: false,
            suggested_file_name: String::new(),
            suggested_file_name_default: "fallback".to_string(),
            overwrite: true,
        }
    }
}

impl SnapshotConfig {
    /// Load options from a JSON file.
    pub fn load(path: &Path) -> SnapshotResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SnapshotError::io_path("read options", path.display().to_string(), e))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Save options to a JSON file.
    pub fn save(&self, path: &Path) -> SnapshotResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .map_err(|e| SnapshotError::io_path("write options", path.display().to_string(), e))
    }

    /// Validate field ranges. Returns a human-readable message for the first
    /// violation found.
    pub fn validate(&self) -> Result<(), String> {
        if self.quality < 1 || self.quality > 100 {
            return Err(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            ));
        }
        if self.max_file_size == 0 {
            return Err("maxFileSize must be at least 1 KB".to_string());
        }
        if self.tolerance == 0 {
            return Err("tolerance must be at least 1".to_string());
        }
        if !(self.device_pixel_ratio > 0.0) {
            return Err(format!(
                "devicePixelRatio must be positive, got {}",
                self.device_pixel_ratio
            ));
        }
        if (self.width == 0) != (self.height == 0) {
            return Err(
                "width and height must both be set, or both 0 for auto-detection".to_string(),
            );
        }
        if Color::from_hex(&self.background_color).is_err() {
            return Err(format!(
                "backgroundColor '{}' is not a valid #rrggbb color",
                self.background_color
            ));
        }
        Ok(())
    }

    /// Resolve the persisted options into the immutable per-request bundle.
    pub fn to_snapshot_options(&self) -> SnapshotResult<SnapshotOptions> {
        let background_color = Color::from_hex(&self.background_color)?;

        let detection = DetectionOptions {
            is_transparent: self.is_transparent,
            background_color,
            tolerance: self.tolerance,
            device_pixel_ratio: self.device_pixel_ratio,
            retina_mode_enabled: self.retina_mode,
        };

        let mode = if self.width == 0 || self.height == 0 {
            DetectionMode::Automatic
        } else {
            DetectionMode::Fixed {
                width: self.width,
                height: self.height,
            }
        };

        let request = match (self.output_mode, self.optimizing_mode) {
            (OutputMode::Png, _) => EncodeRequest::Png,
            (OutputMode::Jpg, OptimizingMode::Quality) => EncodeRequest::JpegQuality(self.quality),
            (OutputMode::Jpg, OptimizingMode::Filesize) => EncodeRequest::JpegUnderBudget {
                // decimal KB: users compare against download sizes
                max_bytes: self.max_file_size as usize * 1000,
                iteration_limit: DEFAULT_ITERATION_LIMIT,
            },
        };

        Ok(SnapshotOptions {
            detection,
            mode,
            request,
            file_name: FileNamePolicy {
                suggested: self.suggested_file_name.clone(),
                fallback: self.suggested_file_name_default.clone(),
                overwrite: self.overwrite,
            },
        })
    }
}
