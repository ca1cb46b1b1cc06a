//! # Snapshot Session Management
//!
//! High-level orchestration of one screenshot pass: decode the capture,
//! locate the banner, crop it at the right resolution, encode it, and hand
//! the artifact to the configured sinks. Built with the same declarative,
//! builder-pattern approach as the rest of the tool:
//!
//! 1. **`run_pass`**: the synchronous detect → map → crop → encode chain
//! 2. **`SnapshotSession`**: owns the option bundle and the sink fan-out
//! 3. **`SnapshotSessionBuilder`**: fluent configuration API
//!
//! Each session processes exactly one screenshot; nothing is shared between
//! passes. The pixel work is CPU-bound, so `SnapshotSession::run` moves it
//! onto a blocking thread and keeps the async runtime responsive.

// External crate imports
use fast_image_resize::Resizer;
use image::DynamicImage;

// Internal module imports
use banner_core::buffer::{BoundingBox, PixelBuffer};
use banner_core::encode::{self, ImageFormat};
use banner_core::{coords, crop, detect};

use crate::error::{SnapshotError, SnapshotResult};
use crate::output::{ArtifactSink, SinkMultiplexer, SnapshotArtifact};
use crate::{DetectionMode, SnapshotOptions};

/// Finished result of one screenshot pass.
///
/// `width`/`height` are the LOGICAL crop dimensions — what the user asked
/// for and what goes into the file name — even when retina mode rendered
/// the pixels at device resolution.
#[derive(Debug, Clone)]
pub struct ProcessedSnapshot {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Quality the final JPEG encode ran at; `None` for PNG.
    pub actual_quality: Option<u8>,
    pub size_bytes: usize,
}

/// Run the synchronous core pipeline over an owned screenshot buffer.
///
/// This is the whole engine in one call: boundary detection (or the fixed
/// crop box), physical→logical mapping, retina-aware crop, and encoding.
pub fn run_pass(
    screenshot: PixelBuffer,
    options: &SnapshotOptions,
) -> SnapshotResult<ProcessedSnapshot> {
    let ratio = options.detection.device_pixel_ratio;

    let logical = match options.mode {
        DetectionMode::Automatic => {
            let seed = detect::find_first_foreground(&screenshot, &options.detection)?;
            let physical = detect::find_boundary(&screenshot, seed, &options.detection);
            coords::to_logical(&physical, ratio)
        }
        // A fixed-size crop always reads from the page origin; the caller
        // already scrolled the banner there.
        DetectionMode::Fixed { width, height } => BoundingBox {
            x: 0,
            y: 0,
            width,
            height,
        },
    };

    let output_ratio =
        coords::effective_output_ratio(options.detection.retina_mode_enabled, ratio);

    let mut resizer = Resizer::new();
    let cropped = crop::crop_rgba_cpu(&mut resizer, &screenshot, &logical, ratio, output_ratio)?;

    let encoded = encode::encode(&cropped, options.request)?;

    Ok(ProcessedSnapshot {
        bytes: encoded.bytes,
        format: encoded.format,
        width: logical.width,
        height: logical.height,
        actual_quality: encoded.actual_quality,
        size_bytes: encoded.size_bytes,
    })
}

/// High-level session that orchestrates one capture pass end to end.
pub struct SnapshotSession {
    options: SnapshotOptions,
    multiplexer: SinkMultiplexer,
}

impl SnapshotSession {
    /// Create a new session using the builder pattern.
    pub fn builder() -> SnapshotSessionBuilder {
        SnapshotSessionBuilder::new()
    }

    /// Process one decoded screenshot and deliver the artifact to every
    /// configured sink.
    pub async fn run(mut self, screenshot: DynamicImage) -> SnapshotResult<ProcessedSnapshot> {
        self.multiplexer.initialize().await?;

        let buffer = PixelBuffer::from_rgba_image(screenshot.to_rgba8());
        println!("Snapshot session started:");
        println!("  Input: {}x{}", buffer.width(), buffer.height());
        println!("  Sinks: {}", self.multiplexer.sink_count());

        let options = self.options.clone();
        let snapshot = tokio::task::spawn_blocking(move || run_pass(buffer, &options))
            .await
            .map_err(|e| SnapshotError::processing("pipeline", e.to_string()))??;

        let file_name =
            self.options
                .file_name
                .file_name(snapshot.width, snapshot.height, snapshot.format);
        let artifact = SnapshotArtifact {
            file_name,
            overwrite: self.options.file_name.overwrite,
            snapshot: snapshot.clone(),
        };
        self.multiplexer.deliver(&artifact).await?;

        Ok(snapshot)
    }
}

/// Builder for snapshot sessions with a fluent API.
pub struct SnapshotSessionBuilder {
    options: Option<SnapshotOptions>,
    sinks: Vec<Box<dyn ArtifactSink>>,
}

impl SnapshotSessionBuilder {
    pub fn new() -> Self {
        Self {
            options: None,
            sinks: Vec::new(),
        }
    }

    /// Set the resolved option bundle for this pass.
    pub fn with_options(mut self, options: SnapshotOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Add a sink to the delivery fan-out.
    pub fn with_sink<S: ArtifactSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Build the session with the configured components.
    pub fn build(self) -> SnapshotResult<SnapshotSession> {
        let options = self
            .options
            .ok_or_else(|| SnapshotError::config("options", "<none>", "no options configured"))?;

        if self.sinks.is_empty() {
            return Err(SnapshotError::config(
                "sinks",
                "<none>",
                "at least one sink must be configured",
            ));
        }

        let mut multiplexer = SinkMultiplexer::new();
        for sink in self.sinks {
            multiplexer.sinks.push(sink);
        }

        Ok(SnapshotSession {
            options,
            multiplexer,
        })
    }
}
