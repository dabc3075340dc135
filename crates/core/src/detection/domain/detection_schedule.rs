/// Cadence of detection passes over a frame stream.
///
/// Tracking runs every frame; full detection only on scheduled frames.
/// The schedule fires on the first frame of each interval, with frames
/// counted from 1.
#[derive(Clone, Copy, Debug)]
pub struct DetectionSchedule {
    frame_interval: usize,
}

impl DetectionSchedule {
    pub fn new(frame_interval: usize) -> Self {
        Self {
            frame_interval: frame_interval.max(1),
        }
    }

    /// Derives the interval from the source frame rate and the configured
    /// seconds between detection passes. Never drops below one frame.
    pub fn from_rate(fps: f64, interval_secs: f64) -> Self {
        let frames = (fps * interval_secs) as usize;
        Self::new(frames)
    }

    pub fn frame_interval(&self) -> usize {
        self.frame_interval
    }

    /// `frame_count` is 1-based: the first frame of the stream is 1.
    pub fn should_detect(&self, frame_count: usize) -> bool {
        if self.frame_interval == 1 {
            return true;
        }
        frame_count % self.frame_interval == 1
    }

    /// Frames remaining until the next scheduled detection pass.
    pub fn frames_until_next(&self, frame_count: usize) -> usize {
        if self.frame_interval == 1 {
            return 1;
        }
        let phase = frame_count % self.frame_interval;
        let remaining = (self.frame_interval + 1 - phase) % self.frame_interval;
        if remaining == 0 {
            self.frame_interval
        } else {
            remaining
        }
    }
}
