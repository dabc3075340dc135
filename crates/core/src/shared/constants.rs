/// Seconds between detection passes; tracking alone carries the frames in between.
pub const DEFAULT_DETECTION_INTERVAL_SECS: f64 = 2.0;

/// Detections at or below this confidence are dropped at the detector boundary.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// IoU above which a detection is considered already covered by an active track.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.3;

/// Cosine similarity above which two descriptors count as the same face.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Pixels added on each side of a detection box before cropping.
pub const DEFAULT_CROP_PADDING: u32 = 15;

/// Minimum linear face size in pixels for the quality size term.
pub const DEFAULT_MIN_FACE_SIZE: u32 = 50;

/// Laplacian-variance value that saturates the quality sharpness term.
pub const DEFAULT_SHARPNESS_THRESHOLD: f64 = 100.0;

/// Worker threads computing descriptors off the main loop.
pub const DEFAULT_POOL_WORKERS: usize = 2;

/// Upper bound on one descriptor extraction before it counts as failed.
pub const DEFAULT_POOL_TIMEOUT_MS: u64 = 5_000;

/// Catalog file name inside the output directory.
pub const CATALOG_FILENAME: &str = "faces_catalog.json";

/// Frame rate assumed for image-sequence input when none is given.
pub const DEFAULT_SEQUENCE_FPS: f64 = 30.0;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
