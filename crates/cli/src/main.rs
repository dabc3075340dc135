use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use faceatlas_core::catalog::domain::dedup_registry::DedupRegistry;
use faceatlas_core::catalog::domain::quality::QualityScorer;
use faceatlas_core::catalog::infrastructure::descriptor_pool::DescriptorPool;
use faceatlas_core::catalog::infrastructure::histogram_descriptor::HistogramDescriptorExtractor;
use faceatlas_core::catalog::infrastructure::json_catalog_store::JsonCatalogStore;
use faceatlas_core::detection::domain::detection_schedule::DetectionSchedule;
use faceatlas_core::detection::infrastructure::cached_detection_source::CachedDetectionSource;
use faceatlas_core::pipeline::catalog_faces_use_case::CatalogFacesUseCase;
use faceatlas_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use faceatlas_core::shared::constants::{
    CATALOG_FILENAME, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_CROP_PADDING,
    DEFAULT_DETECTION_INTERVAL_SECS, DEFAULT_MIN_FACE_SIZE, DEFAULT_OVERLAP_THRESHOLD,
    DEFAULT_POOL_TIMEOUT_MS, DEFAULT_POOL_WORKERS, DEFAULT_SEQUENCE_FPS,
    DEFAULT_SHARPNESS_THRESHOLD, DEFAULT_SIMILARITY_THRESHOLD,
};
use faceatlas_core::tracking::domain::track_registry::TrackRegistry;
use faceatlas_core::tracking::infrastructure::tracker_factory::{create_tracker, TrackerKind};
use faceatlas_core::video::domain::video_reader::VideoReader;
use faceatlas_core::video::infrastructure::image_file_writer::ImageFileWriter;
use faceatlas_core::video::infrastructure::image_sequence_reader::ImageSequenceReader;

/// Builds a best-quality catalog of unique faces from a frame sequence.
#[derive(Parser)]
#[command(name = "faceatlas")]
struct Cli {
    /// Directory of image frames in name order.
    frames: PathBuf,

    /// JSON sidecar with per-frame detector output.
    #[arg(long)]
    detections: PathBuf,

    /// Directory receiving face images and the catalog file.
    #[arg(long, default_value = "unique_faces")]
    output_dir: PathBuf,

    /// Frame rate of the input sequence.
    #[arg(long, default_value_t = DEFAULT_SEQUENCE_FPS)]
    fps: f64,

    /// Seconds between detection passes.
    #[arg(long, default_value_t = DEFAULT_DETECTION_INTERVAL_SECS)]
    detection_interval: f64,

    /// Detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    confidence: f64,

    /// Tracking algorithm: ncc or meanshift.
    #[arg(long, default_value = "ncc")]
    tracker: TrackerKind,

    /// IoU above which a detection is covered by an existing track (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_OVERLAP_THRESHOLD)]
    overlap_threshold: f64,

    /// Cosine similarity above which two faces are the same identity (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    similarity_threshold: f64,

    /// Pixels added around a detection before cropping.
    #[arg(long, default_value_t = DEFAULT_CROP_PADDING)]
    padding: u32,

    /// Minimum linear face size in pixels for quality scoring.
    #[arg(long, default_value_t = DEFAULT_MIN_FACE_SIZE)]
    min_face_size: u32,

    /// Laplacian variance that saturates the quality sharpness term.
    #[arg(long, default_value_t = DEFAULT_SHARPNESS_THRESHOLD)]
    sharpness_threshold: f64,

    /// Descriptor worker threads.
    #[arg(long, default_value_t = DEFAULT_POOL_WORKERS)]
    pool_size: usize,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut reader: Box<dyn VideoReader> = Box::new(ImageSequenceReader::new(cli.fps));
    let metadata = reader.open(&cli.frames)?;

    let schedule = DetectionSchedule::from_rate(metadata.fps, cli.detection_interval);
    log::info!(
        "{} frames at {} fps, detection every {} frames",
        metadata.total_frames,
        metadata.fps,
        schedule.frame_interval()
    );

    let detector = CachedDetectionSource::from_json_file(&cli.detections)?;
    log::info!("loaded detections for {} frames", detector.len());

    let tracker_kind = cli.tracker;
    let tracks = TrackRegistry::new(
        cli.overlap_threshold,
        Box::new(move || create_tracker(tracker_kind)),
    );

    let dedup = DedupRegistry::new(
        Box::new(JsonCatalogStore::new(cli.output_dir.join(CATALOG_FILENAME))),
        Box::new(ImageFileWriter::new()),
        DescriptorPool::new(
            cli.pool_size,
            Arc::new(HistogramDescriptorExtractor::new()),
            Duration::from_millis(DEFAULT_POOL_TIMEOUT_MS),
        ),
        QualityScorer::new(cli.min_face_size, cli.sharpness_threshold),
        cli.similarity_threshold,
        cli.padding,
        cli.output_dir.clone(),
    );

    let mut use_case = CatalogFacesUseCase::new(
        reader,
        Box::new(detector),
        tracks,
        dedup,
        schedule,
        cli.confidence,
        Box::new(StdoutPipelineLogger::default()),
        None,
    );

    let summary = use_case.execute(&metadata)?;

    println!(
        "Processed {} frames ({} detection passes, {} detections).",
        summary.frames, summary.detection_passes, summary.detections
    );
    println!(
        "Catalog: {} new faces, {} matched, {} skipped. Output in {}",
        summary.faces_created,
        summary.faces_matched,
        summary.faces_skipped,
        cli.output_dir.display()
    );

    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    for (name, value) in [
        ("--confidence", cli.confidence),
        ("--overlap-threshold", cli.overlap_threshold),
        ("--similarity-threshold", cli.similarity_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(format!("{name} must be between 0.0 and 1.0").into());
        }
    }
    if cli.fps <= 0.0 {
        return Err("--fps must be positive".into());
    }
    if cli.detection_interval <= 0.0 {
        return Err("--detection-interval must be positive".into());
    }
    if cli.pool_size == 0 {
        return Err("--pool-size must be at least 1".into());
    }
    Ok(())
}
