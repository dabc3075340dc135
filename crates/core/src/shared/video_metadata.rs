use std::path::PathBuf;

/// Properties of an opened frame source.
///
/// `fps` drives the detection schedule; image sequences report whatever
/// rate the caller configured.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub source_path: Option<PathBuf>,
}
