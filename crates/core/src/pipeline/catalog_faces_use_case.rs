use std::time::Instant;

use chrono::Utc;

use crate::catalog::domain::dedup_registry::{DedupRegistry, FaceOutcome};
use crate::detection::domain::detection::Detection;
use crate::detection::domain::detection_schedule::DetectionSchedule;
use crate::detection::domain::detection_source::DetectionSource;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::video_metadata::VideoMetadata;
use crate::tracking::domain::track_registry::TrackRegistry;
use crate::video::domain::video_reader::VideoReader;

/// End-of-run accounting for one catalog pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub frames: usize,
    pub detection_passes: usize,
    pub detections: usize,
    pub faces_created: usize,
    pub faces_matched: usize,
    pub faces_skipped: usize,
    pub active_tracks: usize,
}

/// Drives the per-frame loop: track every frame, detect on schedule, and
/// offer each confident detection for track admission and deduplication.
///
/// The reader is released on every exit path, including mid-stream read
/// failures and cancellation.
pub struct CatalogFacesUseCase {
    reader: Box<dyn VideoReader>,
    detector: Box<dyn DetectionSource>,
    tracks: TrackRegistry,
    dedup: DedupRegistry,
    schedule: DetectionSchedule,
    confidence_threshold: f64,
    logger: Box<dyn PipelineLogger>,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
}

impl CatalogFacesUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader: Box<dyn VideoReader>,
        detector: Box<dyn DetectionSource>,
        tracks: TrackRegistry,
        dedup: DedupRegistry,
        schedule: DetectionSchedule,
        confidence_threshold: f64,
        logger: Box<dyn PipelineLogger>,
        on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    ) -> Self {
        Self {
            reader,
            detector,
            tracks,
            dedup,
            schedule,
            confidence_threshold,
            logger,
            on_progress,
        }
    }

    pub fn execute(
        &mut self,
        metadata: &VideoMetadata,
    ) -> Result<CatalogSummary, Box<dyn std::error::Error>> {
        let result = self.run(metadata);
        self.reader.close();
        self.logger.summary();
        result
    }

    fn run(&mut self, metadata: &VideoMetadata) -> Result<CatalogSummary, Box<dyn std::error::Error>> {
        let Self {
            reader,
            detector,
            tracks,
            dedup,
            schedule,
            confidence_threshold,
            logger,
            on_progress,
        } = self;

        let total_frames = metadata.total_frames;
        let mut summary = CatalogSummary::default();
        let mut frame_count = 0usize;

        for frame_result in reader.frames() {
            let frame = frame_result?;
            frame_count += 1;

            let started = Instant::now();
            let active = tracks.tick(&frame);
            logger.timing("track", started.elapsed().as_secs_f64() * 1000.0);
            logger.metric("active_tracks", active.len() as f64);

            if schedule.should_detect(frame_count) {
                let started = Instant::now();
                let detections = detector.detect(&frame)?;
                let confident = Detection::filter_confident(detections, *confidence_threshold);
                logger.timing("detect", started.elapsed().as_secs_f64() * 1000.0);

                summary.detection_passes += 1;
                summary.detections += confident.len();
                if !confident.is_empty() {
                    logger.info(&format!(
                        "frame {frame_count}: {} confident detections",
                        confident.len()
                    ));
                }

                tracks.admit(&frame, &confident);

                let started = Instant::now();
                for detection in &confident {
                    match dedup.process(&frame, &detection.bbox, Utc::now()) {
                        FaceOutcome::Created { .. } => summary.faces_created += 1,
                        FaceOutcome::Known { .. } => summary.faces_matched += 1,
                        FaceOutcome::Skipped => summary.faces_skipped += 1,
                    }
                }
                logger.timing("dedup", started.elapsed().as_secs_f64() * 1000.0);
            }

            logger.progress(frame_count, total_frames);
            if let Some(callback) = on_progress {
                if !callback(frame_count, total_frames) {
                    return Err("Cancelled".into());
                }
            }
        }

        summary.frames = frame_count;
        summary.active_tracks = tracks.active_count();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::catalog::domain::catalog_store::CatalogStore;
    use crate::catalog::domain::face_record::Catalog;
    use crate::catalog::domain::quality::QualityScorer;
    use crate::catalog::infrastructure::descriptor_pool::DescriptorPool;
    use crate::catalog::infrastructure::histogram_descriptor::HistogramDescriptorExtractor;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::bbox::BoundingBox;
    use crate::shared::frame::Frame;
    use crate::tracking::domain::object_tracker::ObjectTracker;
    use crate::video::domain::image_writer::ImageWriter;

    // --- Stubs ---

    struct StubReader {
        frames: Vec<Frame>,
        fail_at: Option<usize>,
        closed: Arc<AtomicBool>,
    }

    impl VideoReader for StubReader {
        fn open(&mut self, _path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            Ok(metadata(self.frames.len()))
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            let fail_at = self.fail_at;
            Box::new(self.frames.drain(..).enumerate().map(move |(i, frame)| {
                if fail_at == Some(i) {
                    Err("read failure".into())
                } else {
                    Ok(frame)
                }
            }))
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::Relaxed);
        }
    }

    struct StubDetections {
        by_frame: HashMap<usize, Vec<Detection>>,
        calls: Arc<Mutex<Vec<usize>>>,
    }

    impl DetectionSource for StubDetections {
        fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            self.calls.lock().unwrap().push(frame.index());
            Ok(self
                .by_frame
                .get(&frame.index())
                .cloned()
                .unwrap_or_default())
        }
    }

    struct MemStore(Arc<Mutex<Option<Catalog>>>);

    impl CatalogStore for MemStore {
        fn load(&self) -> Result<Option<Catalog>, Box<dyn std::error::Error>> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn save(&self, catalog: &Catalog) -> Result<(), Box<dyn std::error::Error>> {
            *self.0.lock().unwrap() = Some(catalog.clone());
            Ok(())
        }
    }

    struct NullWriter;

    impl ImageWriter for NullWriter {
        fn write(
            &self,
            _path: &Path,
            _frame: &Frame,
            _size: Option<(u32, u32)>,
        ) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
    }

    struct PinnedTracker;

    impl ObjectTracker for PinnedTracker {
        fn init(&mut self, _frame: &Frame, _bbox: BoundingBox) -> bool {
            true
        }
        fn update(&mut self, _frame: &Frame) -> Option<BoundingBox> {
            Some(BoundingBox::new(10, 10, 60, 60))
        }
    }

    // --- Helpers ---

    /// Solid red frame with the given stream index.
    fn red_frame(index: usize) -> Frame {
        let mut data = Vec::with_capacity(200 * 200 * 3);
        for _ in 0..(200 * 200) {
            data.extend_from_slice(&[210, 30, 30]);
        }
        Frame::new(data, 200, 200, 3, index)
    }

    fn metadata(total: usize) -> VideoMetadata {
        VideoMetadata {
            width: 200,
            height: 200,
            fps: 30.0,
            total_frames: total,
            source_path: None,
        }
    }

    fn det(x: i32, confidence: f64) -> Detection {
        Detection {
            bbox: BoundingBox::new(x, 10, 60, 60),
            confidence,
            keypoints: None,
        }
    }

    fn dedup_registry(stored: Arc<Mutex<Option<Catalog>>>) -> DedupRegistry {
        DedupRegistry::new(
            Box::new(MemStore(stored)),
            Box::new(NullWriter),
            DescriptorPool::new(
                2,
                Arc::new(HistogramDescriptorExtractor::new()),
                Duration::from_secs(2),
            ),
            QualityScorer::default(),
            0.7,
            0,
            PathBuf::from("/faces"),
        )
    }

    fn track_registry() -> TrackRegistry {
        TrackRegistry::new(0.3, Box::new(|| Box::new(PinnedTracker)))
    }

    #[allow(clippy::type_complexity)]
    fn use_case(
        frames: Vec<Frame>,
        by_frame: HashMap<usize, Vec<Detection>>,
        schedule: DetectionSchedule,
    ) -> (
        CatalogFacesUseCase,
        Arc<AtomicBool>,
        Arc<Mutex<Vec<usize>>>,
        Arc<Mutex<Option<Catalog>>>,
    ) {
        let closed = Arc::new(AtomicBool::new(false));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let stored = Arc::new(Mutex::new(None));

        let uc = CatalogFacesUseCase::new(
            Box::new(StubReader {
                frames,
                fail_at: None,
                closed: closed.clone(),
            }),
            Box::new(StubDetections {
                by_frame,
                calls: calls.clone(),
            }),
            track_registry(),
            dedup_registry(stored.clone()),
            schedule,
            0.8,
            Box::new(NullPipelineLogger),
            None,
        );
        (uc, closed, calls, stored)
    }

    // --- Tests ---

    #[test]
    fn test_detection_runs_only_on_scheduled_frames() {
        let frames = (0..6).map(red_frame).collect();
        let (mut uc, _, calls, _) = use_case(frames, HashMap::new(), DetectionSchedule::new(3));

        uc.execute(&metadata(6)).unwrap();

        // 1-based frames 1 and 4 → indices 0 and 3.
        assert_eq!(*calls.lock().unwrap(), vec![0, 3]);
    }

    #[test]
    fn test_confident_detection_becomes_track_and_catalog_entry() {
        let by_frame = HashMap::from([(0, vec![det(10, 0.95)])]);
        let frames = (0..3).map(red_frame).collect();
        let (mut uc, _, _, stored) = use_case(frames, by_frame, DetectionSchedule::new(3));

        let summary = uc.execute(&metadata(3)).unwrap();

        assert_eq!(summary.frames, 3);
        assert_eq!(summary.detection_passes, 1);
        assert_eq!(summary.detections, 1);
        assert_eq!(summary.faces_created, 1);
        assert_eq!(summary.active_tracks, 1);

        let catalog = stored.lock().unwrap().clone().unwrap();
        assert_eq!(catalog.records.len(), 1);
        assert_eq!(catalog.records[0].face_id, 1);
    }

    #[test]
    fn test_low_confidence_detection_is_dropped_at_boundary() {
        let by_frame = HashMap::from([(0, vec![det(10, 0.5)])]);
        let frames = (0..2).map(red_frame).collect();
        let (mut uc, _, _, stored) = use_case(frames, by_frame, DetectionSchedule::new(2));

        let summary = uc.execute(&metadata(2)).unwrap();

        assert_eq!(summary.detections, 0);
        assert_eq!(summary.faces_created, 0);
        assert_eq!(summary.active_tracks, 0);
        assert!(stored.lock().unwrap().is_none());
    }

    #[test]
    fn test_repeated_detection_of_same_face_matches_not_creates() {
        // Same appearance on both scheduled frames; the track covers it on
        // the second pass so no duplicate track, and dedup reports a match.
        let by_frame = HashMap::from([
            (0, vec![det(10, 0.95)]),
            (2, vec![det(10, 0.95)]),
        ]);
        let frames = (0..4).map(red_frame).collect();
        let (mut uc, _, _, _) = use_case(frames, by_frame, DetectionSchedule::new(2));

        let summary = uc.execute(&metadata(4)).unwrap();

        assert_eq!(summary.detection_passes, 2);
        assert_eq!(summary.faces_created, 1);
        assert_eq!(summary.faces_matched, 1);
        assert_eq!(summary.active_tracks, 1);
    }

    #[test]
    fn test_reader_closed_after_successful_run() {
        let (mut uc, closed, _, _) =
            use_case(vec![red_frame(0)], HashMap::new(), DetectionSchedule::new(1));
        uc.execute(&metadata(1)).unwrap();
        assert!(closed.load(Ordering::Relaxed));
    }

    #[test]
    fn test_reader_closed_on_mid_stream_failure() {
        let closed = Arc::new(AtomicBool::new(false));
        let mut uc = CatalogFacesUseCase::new(
            Box::new(StubReader {
                frames: (0..4).map(red_frame).collect(),
                fail_at: Some(2),
                closed: closed.clone(),
            }),
            Box::new(StubDetections {
                by_frame: HashMap::new(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }),
            track_registry(),
            dedup_registry(Arc::new(Mutex::new(None))),
            DetectionSchedule::new(2),
            0.8,
            Box::new(NullPipelineLogger),
            None,
        );

        assert!(uc.execute(&metadata(4)).is_err());
        assert!(closed.load(Ordering::Relaxed));
    }

    #[test]
    fn test_cancellation_via_progress_callback() {
        let closed = Arc::new(AtomicBool::new(false));
        let mut uc = CatalogFacesUseCase::new(
            Box::new(StubReader {
                frames: (0..10).map(red_frame).collect(),
                fail_at: None,
                closed: closed.clone(),
            }),
            Box::new(StubDetections {
                by_frame: HashMap::new(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }),
            track_registry(),
            dedup_registry(Arc::new(Mutex::new(None))),
            DetectionSchedule::new(5),
            0.8,
            Box::new(NullPipelineLogger),
            Some(Box::new(|current, _| current < 3)),
        );

        assert!(uc.execute(&metadata(10)).is_err());
        assert!(closed.load(Ordering::Relaxed));
    }

    #[test]
    fn test_empty_stream_yields_empty_summary() {
        let (mut uc, closed, _, _) = use_case(Vec::new(), HashMap::new(), DetectionSchedule::new(1));
        let summary = uc.execute(&metadata(0)).unwrap();
        assert_eq!(summary, CatalogSummary::default());
        assert!(closed.load(Ordering::Relaxed));
    }
}
