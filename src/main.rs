use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use banner_capture::config::{OptimizingMode, OutputMode, SnapshotConfig};
use banner_capture::output::{DataUrlSink, FileSink};
use banner_capture::session::SnapshotSession;

/// Crop the banner out of a screenshot and save it:
/// - boundary detection against a background color or transparency
/// - retina-aware coordinate mapping (capture is physical, crop is logical)
/// - JPEG at fixed quality, JPEG under a byte budget, or lossless PNG
#[derive(Parser, Debug)]
#[command(name = "bcap")]
#[command(about = "📸 Crop banner regions out of screenshots and save them as JPEG/PNG")]
#[command(long_about = "Crop banner regions out of full-page screenshots.
The banner is located automatically by scanning pixels against the background color
(or transparency), or cropped at an explicit size. JPEG output can target a fixed
quality or the highest quality that fits a file-size budget.")]
struct Args {
    /// Input screenshot image (PNG or JPEG)
    input: PathBuf,

    /// Output directory for saved banners
    #[arg(short, long, default_value = ".", help = "Directory the banner is saved into")]
    out_dir: PathBuf,

    /// Options file (JSON); flags below override its values
    #[arg(short, long, help = "Load persisted options from a JSON file")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, help = "Output format: jpg (lossy, quality/filesize modes) or png (lossless)")]
    format: Option<String>,

    /// JPEG optimization target
    #[arg(long,
          help = "JPEG optimization: quality (fixed quality) or filesize (fit a byte budget)")]
    optimize: Option<String>,

    /// JPEG quality for quality mode
    #[arg(short, long, help = "JPEG quality 1-100 (quality mode)")]
    quality: Option<u8>,

    /// Target file size in KB for filesize mode
    #[arg(long, help = "Target file size in KB (filesize mode)")]
    max_kb: Option<u32>,

    /// Fixed crop width in logical pixels (omit for auto-detection)
    #[arg(long, help = "Fixed crop width in logical pixels; requires --height")]
    width: Option<u32>,

    /// Fixed crop height in logical pixels (omit for auto-detection)
    #[arg(long, help = "Fixed crop height in logical pixels; requires --width")]
    height: Option<u32>,

    /// Background color the banner sits on
    #[arg(long, help = "Backdrop color for boundary detection, e.g. '#ffffff'")]
    bg_color: Option<String>,

    /// Detect against transparency instead of a background color
    #[arg(long, help = "Treat the backdrop as transparent instead of a solid color")]
    transparent: bool,

    /// Device pixel ratio the screenshot was captured at
    #[arg(long, help = "Device pixel ratio of the capture (e.g. 2 on retina displays)")]
    dpr: Option<f64>,

    /// Render output at full device resolution
    #[arg(long, help = "Keep device resolution in the output instead of logical resolution")]
    retina: bool,

    /// Base file name without extension
    #[arg(short = 'n', long,
          help = "Explicit output file name (without extension); default embeds the crop size")]
    name: Option<String>,

    /// Also print the result as a base64 data URL
    #[arg(long, help = "Additionally print the encoded image as a data: URL")]
    data_url: bool,

    /// Keep existing files instead of overwriting them
    #[arg(long, help = "Pick a unique file name instead of replacing an existing file")]
    no_overwrite: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SnapshotConfig::load(path)?,
        None => SnapshotConfig::default(),
    };
    apply_overrides(&mut config, &args)?;

    config.validate().map_err(anyhow::Error::msg)?;
    let options = config.to_snapshot_options()?;

    let screenshot = image::open(&args.input).map_err(|e| {
        anyhow::anyhow!("failed to open '{}': {}", args.input.display(), e)
    })?;

    let mut builder = SnapshotSession::builder()
        .with_options(options)
        .with_sink(FileSink::new(&args.out_dir));
    if args.data_url {
        builder = builder.with_sink(DataUrlSink);
    }

    let result = builder.build()?.run(screenshot).await?;

    match result.actual_quality {
        Some(quality) => println!(
            "Banner saved: {}x{}, {} bytes, JPEG quality {}",
            result.width, result.height, result.size_bytes, quality
        ),
        None => println!(
            "Banner saved: {}x{}, {} bytes, PNG",
            result.width, result.height, result.size_bytes
        ),
    }
    Ok(())
}

/// Fold CLI flags over the loaded configuration.
fn apply_overrides(config: &mut SnapshotConfig, args: &Args) -> Result<()> {
    if let Some(format) = &args.format {
        config.output_mode = parse_format(format)?;
    }
    if let Some(optimize) = &args.optimize {
        config.optimizing_mode = parse_optimize(optimize)?;
    }

    if let Some(quality) = args.quality {
        config.quality = quality;
    }
    if let Some(max_kb) = args.max_kb {
        config.max_file_size = max_kb;
        // asking for a budget implies filesize mode
        config.optimizing_mode = OptimizingMode::Filesize;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(bg) = &args.bg_color {
        config.background_color = bg.clone();
    }
    if args.transparent {
        config.is_transparent = true;
    }
    if let Some(dpr) = args.dpr {
        config.device_pixel_ratio = dpr;
    }
    if args.retina {
        config.retina_mode = true;
    }
    if let Some(name) = &args.name {
        config.suggested_file_name = name.clone();
    }
    if args.no_overwrite {
        config.overwrite = false;
    }
    Ok(())
}

/// Parse the output format flag into an `OutputMode`.
fn parse_format(format: &str) -> Result<OutputMode> {
    match format.to_lowercase().as_str() {
        "jpg" | "jpeg" => Ok(OutputMode::Jpg),
        "png" => Ok(OutputMode::Png),
        _ => Err(anyhow::anyhow!(
            "Invalid format: {}. Use: jpg, png",
            format
        )),
    }
}

/// Parse the optimization flag into an `OptimizingMode`.
fn parse_optimize(optimize: &str) -> Result<OptimizingMode> {
    match optimize.to_lowercase().as_str() {
        "quality" => Ok(OptimizingMode::Quality),
        "filesize" | "size" => Ok(OptimizingMode::Filesize),
        _ => Err(anyhow::anyhow!(
            "Invalid optimization mode: {}. Use: quality, filesize",
            optimize
        )),
    }
}
