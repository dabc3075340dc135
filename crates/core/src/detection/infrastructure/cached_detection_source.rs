use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::detection_source::DetectionSource;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum DetectionFileError {
    #[error("failed to read detections file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse detections file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid frame index key {0:?}")]
    BadFrameIndex(String),
}

/// Sidecar file format: frame index (as a JSON object key) to the
/// detections produced for that frame.
#[derive(Deserialize)]
struct DetectionFile {
    frames: HashMap<String, Vec<Detection>>,
}

/// Replays pre-computed detection results by frame index.
///
/// The detector itself is an external collaborator; this adapter feeds its
/// recorded output back through the [`DetectionSource`] boundary, keyed by
/// the frame's position in the stream. Frames without an entry yield no
/// detections.
pub struct CachedDetectionSource {
    cache: HashMap<usize, Vec<Detection>>,
}

impl CachedDetectionSource {
    pub fn new(cache: HashMap<usize, Vec<Detection>>) -> Self {
        Self { cache }
    }

    /// Loads a JSON sidecar produced by an external detection run.
    pub fn from_json_file(path: &Path) -> Result<Self, DetectionFileError> {
        let text = std::fs::read_to_string(path)?;
        let file: DetectionFile = serde_json::from_str(&text)?;

        let mut cache = HashMap::with_capacity(file.frames.len());
        for (key, detections) in file.frames {
            let index: usize = key
                .parse()
                .map_err(|_| DetectionFileError::BadFrameIndex(key.clone()))?;
            cache.insert(index, detections);
        }
        Ok(Self { cache })
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl DetectionSource for CachedDetectionSource {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        Ok(self.cache.get(&frame.index()).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::bbox::BoundingBox;

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 100 * 100 * 3], 100, 100, 3, index)
    }

    fn det(x: i32, confidence: f64) -> Detection {
        Detection {
            bbox: BoundingBox::new(x, 20, 50, 50),
            confidence,
            keypoints: None,
        }
    }

    #[test]
    fn test_returns_cached_detections_for_known_frame() {
        let detections = vec![det(10, 0.9), det(60, 0.85)];
        let cache = HashMap::from([(0, detections.clone())]);
        let mut source = CachedDetectionSource::new(cache);

        assert_eq!(source.detect(&frame(0)).unwrap(), detections);
    }

    #[test]
    fn test_unknown_frame_yields_no_detections() {
        let cache = HashMap::from([(0, vec![det(10, 0.9)])]);
        let mut source = CachedDetectionSource::new(cache);

        assert!(source.detect(&frame(5)).unwrap().is_empty());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detections.json");
        std::fs::write(
            &path,
            r#"{
                "frames": {
                    "0": [{"bbox": {"x": 10, "y": 20, "width": 50, "height": 50}, "confidence": 0.9}],
                    "60": [
                        {"bbox": {"x": 12, "y": 22, "width": 48, "height": 52}, "confidence": 0.85,
                         "keypoints": {"nose": [30, 40]}}
                    ]
                }
            }"#,
        )
        .unwrap();

        let mut source = CachedDetectionSource::from_json_file(&path).unwrap();
        assert_eq!(source.len(), 2);

        let first = source.detect(&frame(0)).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].bbox, BoundingBox::new(10, 20, 50, 50));

        let second = source.detect(&frame(60)).unwrap();
        assert_eq!(second[0].keypoints.as_ref().unwrap()["nose"], (30, 40));
    }

    #[test]
    fn test_from_json_file_missing_file_errors() {
        let result = CachedDetectionSource::from_json_file(Path::new("/nonexistent/d.json"));
        assert!(matches!(result, Err(DetectionFileError::Io(_))));
    }

    #[test]
    fn test_from_json_file_bad_index_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detections.json");
        std::fs::write(&path, r#"{"frames": {"not-a-number": []}}"#).unwrap();

        let result = CachedDetectionSource::from_json_file(&path);
        assert!(matches!(result, Err(DetectionFileError::BadFrameIndex(_))));
    }

    #[test]
    fn test_from_json_file_malformed_json_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detections.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = CachedDetectionSource::from_json_file(&path);
        assert!(matches!(result, Err(DetectionFileError::Parse(_))));
    }
}
