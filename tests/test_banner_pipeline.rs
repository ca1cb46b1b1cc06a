//! End-to-end tests for the detection → mapping → crop → encode pipeline
//! and the session/sink orchestration around it.

mod common;

use banner_capture::config::{OptimizingMode, OutputMode, SnapshotConfig};
use banner_capture::output::FileSink;
use banner_capture::session::{run_pass, SnapshotSession};
use banner_capture::{DetectionMode, HasRecoverySuggestion};
use banner_core::buffer::{BoundingBox, Color, PixelBuffer};
use banner_core::coords;
use banner_core::detect::{self, DetectionOptions};
use banner_core::encode::EncodeRequest;

use common::{buffer_with_banner, screenshot_with_banner, uniform_buffer, GRAY};

fn detection(dpr: f64, retina: bool) -> DetectionOptions {
    DetectionOptions {
        device_pixel_ratio: dpr,
        retina_mode_enabled: retina,
        ..DetectionOptions::default()
    }
}

/// 1200x800 physical capture at dpr=2 with a gray 300x100 banner at
/// physical (100, 50). Detection is physical, mapping halves everything,
/// and the non-retina crop renders at logical resolution.
#[test]
fn detects_and_maps_retina_screenshot() {
    let banner = BoundingBox {
        x: 100,
        y: 50,
        width: 300,
        height: 100,
    };
    let screenshot = buffer_with_banner(1200, 800, banner, GRAY);
    let opts = detection(2.0, false);

    let seed = detect::find_first_foreground(&screenshot, &opts).unwrap();
    let physical = detect::find_boundary(&screenshot, seed, &opts);
    assert_eq!(physical, banner);

    let logical = coords::to_logical(&physical, opts.device_pixel_ratio);
    assert_eq!(
        logical,
        BoundingBox {
            x: 50,
            y: 25,
            width: 150,
            height: 50
        }
    );

    let ratio = coords::effective_output_ratio(opts.retina_mode_enabled, opts.device_pixel_ratio);
    assert_eq!(ratio, 1.0);
    let mut resizer = fast_image_resize::Resizer::new();
    let cropped =
        banner_core::crop::crop_rgba_cpu(&mut resizer, &screenshot, &logical, 2.0, ratio).unwrap();
    assert_eq!((cropped.width(), cropped.height()), (150, 50));
}

/// Same capture with retina mode on: identical source rectangle, but the
/// output keeps the physical resolution.
#[test]
fn retina_mode_doubles_output_resolution() {
    let banner = BoundingBox {
        x: 100,
        y: 50,
        width: 300,
        height: 100,
    };
    let screenshot = buffer_with_banner(1200, 800, banner, GRAY);
    let opts = detection(2.0, true);

    let seed = detect::find_first_foreground(&screenshot, &opts).unwrap();
    let logical = coords::to_logical(&detect::find_boundary(&screenshot, seed, &opts), 2.0);

    let ratio = coords::effective_output_ratio(opts.retina_mode_enabled, opts.device_pixel_ratio);
    assert_eq!(ratio, 2.0);
    let mut resizer = fast_image_resize::Resizer::new();
    let cropped =
        banner_core::crop::crop_rgba_cpu(&mut resizer, &screenshot, &logical, 2.0, ratio).unwrap();
    assert_eq!((cropped.width(), cropped.height()), (300, 100));
}

#[test]
fn uniform_screenshot_reports_detection_failure() {
    let screenshot = uniform_buffer(320, 240, Color::WHITE);
    let err = detect::find_first_foreground(&screenshot, &detection(1.0, false)).unwrap_err();
    assert_eq!(err.to_string(), "could not detect banner boundaries");
}

#[test]
fn filesize_mode_stays_under_budget_end_to_end() {
    // Checkerboard content keeps the JPEG big enough for the budget to bite.
    let mut data = Vec::new();
    for y in 0..200u32 {
        for x in 0..300u32 {
            let on = (x / 4 + y / 4) % 2 == 0;
            let v = if on { 30 } else { 220 };
            data.extend_from_slice(&[v, 255 - v, v / 2, 255]);
        }
    }
    let cropped = PixelBuffer::new(300, 200, data).unwrap();

    let full = banner_core::encode::encode(&cropped, EncodeRequest::JpegQuality(100)).unwrap();
    let budget = full.size_bytes * 3 / 4;
    let encoded = banner_core::encode::encode(
        &cropped,
        EncodeRequest::JpegUnderBudget {
            max_bytes: budget,
            iteration_limit: banner_core::encode::DEFAULT_ITERATION_LIMIT,
        },
    )
    .unwrap();

    let quality = encoded.actual_quality.unwrap();
    if quality > 1 {
        assert!(
            encoded.size_bytes <= budget,
            "size {} exceeded budget {budget} at quality {quality}",
            encoded.size_bytes
        );
    }
    assert!(quality >= 1 && quality <= 100);
}

#[tokio::test]
async fn session_saves_detected_banner_to_file() {
    let out = tempfile::tempdir().unwrap();
    let banner = BoundingBox {
        x: 40,
        y: 20,
        width: 120,
        height: 60,
    };
    let screenshot = screenshot_with_banner(640, 480, banner, GRAY);

    let config = SnapshotConfig::default();
    let session = SnapshotSession::builder()
        .with_options(config.to_snapshot_options().unwrap())
        .with_sink(FileSink::new(out.path()))
        .build()
        .unwrap();

    let result = session.run(screenshot).await.unwrap();
    assert_eq!((result.width, result.height), (120, 60));
    assert_eq!(result.actual_quality, Some(90));

    let saved = out.path().join("fallback_120x60.jpg");
    assert!(saved.exists());
    assert_eq!(
        std::fs::read(&saved).unwrap().len(),
        result.size_bytes
    );
}

#[tokio::test]
async fn session_honors_suggested_name_and_png_mode() {
    let out = tempfile::tempdir().unwrap();
    let banner = BoundingBox {
        x: 0,
        y: 0,
        width: 64,
        height: 32,
    };
    let screenshot = screenshot_with_banner(128, 64, banner, GRAY);

    let mut config = SnapshotConfig::default();
    config.output_mode = OutputMode::Png;
    config.suggested_file_name = "creative".to_string();

    let session = SnapshotSession::builder()
        .with_options(config.to_snapshot_options().unwrap())
        .with_sink(FileSink::new(out.path()))
        .build()
        .unwrap();

    let result = session.run(screenshot).await.unwrap();
    assert_eq!(result.actual_quality, None);
    assert!(out.path().join("creative.png").exists());
}

#[tokio::test]
async fn session_fixed_mode_skips_detection() {
    let out = tempfile::tempdir().unwrap();
    // fully black screenshot: automatic detection would grab everything,
    // fixed mode must crop exactly the requested region from the origin
    let screenshot = screenshot_with_banner(
        400,
        300,
        BoundingBox {
            x: 0,
            y: 0,
            width: 400,
            height: 300,
        },
        Color { r: 0, g: 0, b: 0 },
    );

    let mut config = SnapshotConfig::default();
    config.width = 300;
    config.height = 250;
    let options = config.to_snapshot_options().unwrap();
    assert!(matches!(
        options.mode,
        DetectionMode::Fixed {
            width: 300,
            height: 250
        }
    ));

    let session = SnapshotSession::builder()
        .with_options(options)
        .with_sink(FileSink::new(out.path()))
        .build()
        .unwrap();

    let result = session.run(screenshot).await.unwrap();
    assert_eq!((result.width, result.height), (300, 250));
    assert!(out.path().join("fallback_300x250.jpg").exists());
}

#[tokio::test]
async fn session_surfaces_actionable_detection_error() {
    let out = tempfile::tempdir().unwrap();
    let screenshot = screenshot_with_banner(
        64,
        64,
        BoundingBox {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        },
        GRAY,
    );

    let session = SnapshotSession::builder()
        .with_options(SnapshotConfig::default().to_snapshot_options().unwrap())
        .with_sink(FileSink::new(out.path()))
        .build()
        .unwrap();

    let err = session.run(screenshot).await.unwrap_err();
    assert_eq!(err.to_string(), "could not detect banner boundaries");
    assert!(err.recovery_suggestion().is_some());
    // nothing was written
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn filesize_config_flows_through_run_pass() {
    let banner = BoundingBox {
        x: 10,
        y: 10,
        width: 200,
        height: 120,
    };
    let screenshot = buffer_with_banner(400, 300, banner, GRAY);

    let mut config = SnapshotConfig::default();
    config.optimizing_mode = OptimizingMode::Filesize;
    config.max_file_size = 2; // 2000 bytes, tight for a 200x120 crop
    let options = config.to_snapshot_options().unwrap();

    let result = run_pass(screenshot, &options).unwrap();
    let quality = result.actual_quality.unwrap();
    if quality > 1 {
        assert!(result.size_bytes <= 2000);
    }
}
