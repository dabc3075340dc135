use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for face detection.
///
/// Implementations may be stateful (e.g., replaying cached results by
/// frame index), hence `&mut self`. Output order is preserved by every
/// downstream consumer.
pub trait DetectionSource: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;
}
