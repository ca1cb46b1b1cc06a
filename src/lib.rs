//! # Banner Capture Library
//!
//! Turns a full-page screenshot into a tightly cropped, size-controlled
//! banner image. Given a physical-resolution capture, the pipeline locates
//! the rectangular banner sitting on a known backdrop (or takes an explicit
//! crop size), rescales it between device and CSS pixel space, and encodes
//! it to JPEG or PNG — either at a fixed quality or squeezed under a byte
//! budget.
//!
//! ## Architecture
//!
//! The library is organized into a small set of modules:
//! - `config`: persisted options, validation, and per-request resolution
//! - `session`: one-pass orchestration (decode → detect → crop → encode)
//! - `output`: artifact sinks (file, data URL) and the delivery fan-out
//! - `error`: hierarchical error types with context and classification
//!
//! The pixel engine itself — classification, boundary walking, coordinate
//! mapping, cropping, and the size-constrained encoder search — lives in
//! the [`banner_core`] member crate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use banner_capture::config::SnapshotConfig;
//! use banner_capture::output::FileSink;
//! use banner_capture::session::SnapshotSession;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SnapshotConfig::default();
//! config.validate().map_err(anyhow::Error::msg)?;
//!
//! let session = SnapshotSession::builder()
//!     .with_options(config.to_snapshot_options()?)
//!     .with_sink(FileSink::new("out"))
//!     .build()?;
//!
//! let screenshot = image::open("screenshot.png")?;
//! let result = session.run(screenshot).await?;
//! println!("saved {}x{} ({} bytes)", result.width, result.height, result.size_bytes);
//! # Ok(())
//! # }
//! ```

// Internal module imports
pub mod config;
pub mod error;
pub mod output;
pub mod session;

/// Re-export error types for convenience
pub use error::{
    HasRecoverySuggestion, HasSeverity, Recoverable, Retryable, SnapshotError, SnapshotResult,
};

use banner_core::detect::DetectionOptions;
use banner_core::encode::EncodeRequest;

use output::FileNamePolicy;

/// How the crop region is chosen.
#[derive(Debug, Clone, Copy)]
pub enum DetectionMode {
    /// Scan the pixels for the banner's bounding box.
    Automatic,
    /// Crop a fixed logical-pixel region from the page origin, as measured
    /// by the embedding application (DOM lookup and the like).
    Fixed { width: u32, height: u32 },
}

/// Resolved, immutable option bundle for one screenshot pass.
///
/// Constructed from [`config::SnapshotConfig`] per request; nothing in the
/// pipeline reads configuration state after this point.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Pixel classification and coordinate mapping settings.
    pub detection: DetectionOptions,
    /// Automatic detection vs fixed crop size.
    pub mode: DetectionMode,
    /// Output format and quality/budget selection.
    pub request: EncodeRequest,
    /// Output naming and overwrite policy.
    pub file_name: FileNamePolicy,
}

/// Process one decoded screenshot without any sink delivery.
///
/// Convenience entry point for embedders that handle their own output; the
/// CLI and other sink-based callers go through [`session::SnapshotSession`].
pub async fn process_screenshot(
    screenshot: image::DynamicImage,
    options: SnapshotOptions,
) -> SnapshotResult<session::ProcessedSnapshot> {
    let buffer = banner_core::buffer::PixelBuffer::from_rgba_image(screenshot.to_rgba8());
    tokio::task::spawn_blocking(move || session::run_pass(buffer, &options))
        .await
        .map_err(|e| SnapshotError::processing("pipeline", e.to_string()))?
}
