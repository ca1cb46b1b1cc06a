//! # Output Sinks
//!
//! Delivery of processed snapshots to their destinations, behind the
//! composable `ArtifactSink` trait:
//!
//! 1. **ArtifactSink trait**: abstract delivery destination
//! 2. **FileSink**: writes the encoded bytes into an output directory,
//!    honoring the overwrite / unique-name policy
//! 3. **DataUrlSink**: prints a base64 `data:` URL, the transport format
//!    browser download managers consume
//! 4. **SinkMultiplexer**: concurrent broadcast to every configured sink
//!
//! Sinks receive the same immutable artifact; broadcast results are reduced
//! in sink order, not completion order, so delivery is deterministic.

use std::path::PathBuf;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures_util::future::join_all;

use banner_core::encode::ImageFormat;

use crate::error::{SnapshotError, SnapshotResult};
use crate::session::ProcessedSnapshot;

/// How output files are named.
///
/// An explicit suggested name wins; otherwise the fallback base name is
/// suffixed with the logical crop dimensions, e.g. `fallback_300x250.jpg`.
#[derive(Debug, Clone)]
pub struct FileNamePolicy {
    /// Explicit file name without extension; empty means "use the fallback".
    pub suggested: String,
    /// Base name used when no explicit name is set.
    pub fallback: String,
    /// Replace an existing file instead of picking a unique name.
    pub overwrite: bool,
}

impl FileNamePolicy {
    pub fn file_name(&self, width: u32, height: u32, format: ImageFormat) -> String {
        if self.suggested.is_empty() {
            format!(
                "{}_{}x{}.{}",
                self.fallback,
                width,
                height,
                format.extension()
            )
        } else {
            format!("{}.{}", self.suggested, format.extension())
        }
    }
}

/// One encoded snapshot ready for delivery.
#[derive(Debug, Clone)]
pub struct SnapshotArtifact {
    pub file_name: String,
    pub overwrite: bool,
    pub snapshot: ProcessedSnapshot,
}

/// Abstract delivery destination.
/// Implement this trait to route finished snapshots somewhere new.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Prepare the sink (create directories, open connections).
    async fn initialize(&mut self) -> SnapshotResult<()>;
    /// Deliver one artifact.
    async fn deliver(&mut self, artifact: &SnapshotArtifact) -> SnapshotResult<()>;
    /// Short human-readable description for status output.
    fn describe(&self) -> String;
}

/// Writes artifacts into an output directory.
pub struct FileSink {
    pub dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    // "name.jpg" -> "name (1).jpg", "name (2).jpg", ... first free slot wins.
    fn unique_path(&self, file_name: &str) -> PathBuf {
        let candidate = self.dir.join(file_name);
        if !candidate.exists() {
            return candidate;
        }
        let (stem, ext) = match file_name.rsplit_once('.') {
            Some((stem, ext)) => (stem.to_string(), format!(".{ext}")),
            None => (file_name.to_string(), String::new()),
        };
        let mut counter = 1u32;
        loop {
            let candidate = self.dir.join(format!("{stem} ({counter}){ext}"));
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }
}

#[async_trait]
impl ArtifactSink for FileSink {
    async fn initialize(&mut self) -> SnapshotResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            SnapshotError::io_path("create output directory", self.dir.display().to_string(), e)
        })
    }

    async fn deliver(&mut self, artifact: &SnapshotArtifact) -> SnapshotResult<()> {
        let path = if artifact.overwrite {
            self.dir.join(&artifact.file_name)
        } else {
            self.unique_path(&artifact.file_name)
        };
        std::fs::write(&path, &artifact.snapshot.bytes)
            .map_err(|e| SnapshotError::io_path("write snapshot", path.display().to_string(), e))?;
        println!(
            "Saved {} ({}x{}, {} bytes)",
            path.display(),
            artifact.snapshot.width,
            artifact.snapshot.height,
            artifact.snapshot.size_bytes
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.dir.display())
    }
}

/// Prints the artifact as a base64 data URL on stdout.
pub struct DataUrlSink;

#[async_trait]
impl ArtifactSink for DataUrlSink {
    async fn initialize(&mut self) -> SnapshotResult<()> {
        Ok(())
    }

    async fn deliver(&mut self, artifact: &SnapshotArtifact) -> SnapshotResult<()> {
        println!(
            "data:{};base64,{}",
            artifact.snapshot.format.mime_type(),
            BASE64.encode(&artifact.snapshot.bytes)
        );
        Ok(())
    }

    fn describe(&self) -> String {
        "data-url".to_string()
    }
}

/// Broadcasts one artifact to every configured sink concurrently.
pub struct SinkMultiplexer {
    pub sinks: Vec<Box<dyn ArtifactSink>>,
}

impl SinkMultiplexer {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub async fn initialize(&mut self) -> SnapshotResult<()> {
        for sink in &mut self.sinks {
            sink.initialize().await?;
        }
        Ok(())
    }

    /// Deliver to all sinks concurrently. Results are checked in sink order.
    pub async fn deliver(&mut self, artifact: &SnapshotArtifact) -> SnapshotResult<()> {
        let futures: Vec<_> = self
            .sinks
            .iter_mut()
            .map(|sink| sink.deliver(artifact))
            .collect();
        for result in join_all(futures).await {
            result?;
        }
        Ok(())
    }
}
