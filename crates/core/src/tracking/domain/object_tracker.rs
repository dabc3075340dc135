use crate::shared::bbox::BoundingBox;
use crate::shared::frame::Frame;

/// Opaque per-track visual tracking capability.
///
/// The registry owns one instance per track and drives it frame by frame;
/// the algorithm behind it is interchangeable.
pub trait ObjectTracker: Send {
    /// Binds the tracker to the region of `frame` under `bbox`.
    ///
    /// Returns `false` when the region cannot be tracked (empty or outside
    /// the frame); the caller discards the track.
    fn init(&mut self, frame: &Frame, bbox: BoundingBox) -> bool;

    /// Advances the tracker by one frame, returning the updated box.
    ///
    /// `None` means the target is lost; a lost track is never resumed.
    fn update(&mut self, frame: &Frame) -> Option<BoundingBox>;
}
