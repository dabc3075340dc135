use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Adapts an ordered directory of image files to the [`VideoReader`]
/// interface.
///
/// Files are sorted by name, so zero-padded frame numbering yields stream
/// order. The frame rate is whatever the caller configures; it only
/// drives the detection schedule, not playback.
pub struct ImageSequenceReader {
    fps: f64,
    paths: Vec<PathBuf>,
    metadata: Option<VideoMetadata>,
}

impl ImageSequenceReader {
    pub fn new(fps: f64) -> Self {
        Self {
            fps,
            paths: Vec::new(),
            metadata: None,
        }
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_frame(path: &Path, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
    let img = image::open(path)
        .map_err(|e| format!("failed to decode {}: {e}", path.display()))?
        .to_rgb8();
    let (width, height) = img.dimensions();
    Ok(Frame::new(img.into_raw(), width, height, 3, index))
}

impl VideoReader for ImageSequenceReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(path)
            .map_err(|e| format!("failed to open frames directory {}: {e}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image_file(p))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(format!("no image frames found in {}", path.display()).into());
        }

        // First frame fixes the nominal dimensions.
        let first = load_frame(&paths[0], 0)?;
        let metadata = VideoMetadata {
            width: first.width(),
            height: first.height(),
            fps: self.fps,
            total_frames: paths.len(),
            source_path: Some(path.to_path_buf()),
        };

        self.paths = paths;
        self.metadata = Some(metadata.clone());
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        if self.metadata.is_none() {
            return Box::new(std::iter::once(Err("ImageSequenceReader: not opened".into())));
        }
        Box::new(
            self.paths
                .iter()
                .enumerate()
                .map(|(index, path)| load_frame(path, index)),
        )
    }

    fn close(&mut self) {
        self.paths.clear();
        self.metadata = None;
    }
}
