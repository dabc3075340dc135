use std::collections::BTreeMap;

use crate::detection::domain::detection::Detection;
use crate::shared::bbox::BoundingBox;
use crate::shared::frame::Frame;
use crate::tracking::domain::object_tracker::ObjectTracker;

/// Constructs a fresh tracker instance for each admitted detection.
pub type TrackerFactory = Box<dyn Fn() -> Box<dyn ObjectTracker> + Send>;

/// A tracked face: stable id plus continuously updated position.
struct Track {
    bbox: BoundingBox,
    tracker: Box<dyn ObjectTracker>,
    confidence_at_admission: f64,
}

/// Read-only view of an active track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackSnapshot {
    pub id: u32,
    pub bbox: BoundingBox,
    pub confidence_at_admission: f64,
}

/// Owns the set of active tracks between detection passes.
///
/// Every frame, [`tick`](TrackRegistry::tick) delegates to each track's
/// tracker and drops the ones that report loss. On detection frames,
/// [`admit`](TrackRegistry::admit) turns uncovered detections into new
/// tracks, gated by IoU against the tracks already active.
///
/// Iteration order is the explicit contract: the `BTreeMap` keyed by id
/// yields tracks in ascending creation order, and ids are never reused.
pub struct TrackRegistry {
    tracks: BTreeMap<u32, Track>,
    next_id: u32,
    overlap_threshold: f64,
    tracker_factory: TrackerFactory,
}

impl TrackRegistry {
    pub fn new(overlap_threshold: f64, tracker_factory: TrackerFactory) -> Self {
        Self {
            tracks: BTreeMap::new(),
            next_id: 0,
            overlap_threshold,
            tracker_factory,
        }
    }

    /// Advances every active track against `frame`, in ascending id order.
    ///
    /// Tracks whose tracker reports loss are removed permanently after the
    /// full pass; their ids never reappear. Never creates tracks.
    pub fn tick(&mut self, frame: &Frame) -> Vec<TrackSnapshot> {
        let mut lost: Vec<u32> = Vec::new();

        for (id, track) in self.tracks.iter_mut() {
            match track.tracker.update(frame) {
                Some(bbox) => track.bbox = bbox,
                None => lost.push(*id),
            }
        }

        for id in &lost {
            self.tracks.remove(id);
            log::debug!("track {id} lost, removed");
        }

        self.snapshots()
    }

    /// Offers detector output for track admission, in detector order.
    ///
    /// A detection overlapping any track active at call entry above the
    /// overlap threshold is skipped as already represented. Otherwise a
    /// track id is allocated and a tracker initialized; init failure
    /// discards the track but the id stays consumed. Detections within the
    /// same call are not gated against each other, so two overlapping
    /// same-pass detections can both become tracks.
    ///
    /// Returns the number of tracks created.
    pub fn admit(&mut self, frame: &Frame, detections: &[Detection]) -> usize {
        let existing: Vec<BoundingBox> = self.tracks.values().map(|t| t.bbox).collect();
        let mut admitted = 0;

        for detection in detections {
            let covered = existing
                .iter()
                .any(|b| b.iou(&detection.bbox) > self.overlap_threshold);
            if covered {
                continue;
            }

            let id = self.next_id;
            self.next_id += 1;

            let mut tracker = (self.tracker_factory)();
            if !tracker.init(frame, detection.bbox) {
                log::warn!("tracker init failed, discarding detection (id {id} consumed)");
                continue;
            }

            self.tracks.insert(
                id,
                Track {
                    bbox: detection.bbox,
                    tracker,
                    confidence_at_admission: detection.confidence,
                },
            );
            admitted += 1;
        }

        admitted
    }

    /// Active tracks in ascending id order.
    pub fn snapshots(&self) -> Vec<TrackSnapshot> {
        self.tracks
            .iter()
            .map(|(id, t)| TrackSnapshot {
                id: *id,
                bbox: t.bbox,
                confidence_at_admission: t.confidence_at_admission,
            })
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.tracks.len()
    }
}
