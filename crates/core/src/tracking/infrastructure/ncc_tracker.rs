use crate::shared::bbox::BoundingBox;
use crate::shared::frame::Frame;
use crate::tracking::domain::object_tracker::ObjectTracker;

pub const DEFAULT_SEARCH_RADIUS: i32 = 16;
pub const DEFAULT_MIN_SCORE: f64 = 0.5;

/// Template tracker using normalized cross-correlation.
///
/// Stores the grayscale patch under the initial box and, each frame,
/// searches a bounded window around the last position for the offset with
/// the highest correlation. Keeps the initial template (no re-sampling),
/// trading adaptivity for drift resistance over the short track lifetimes
/// between detection passes.
pub struct NccTracker {
    template: Vec<f32>,
    template_norm: f64,
    bbox: BoundingBox,
    search_radius: i32,
    min_score: f64,
}

impl NccTracker {
    pub fn new(search_radius: i32, min_score: f64) -> Self {
        Self {
            template: Vec::new(),
            template_norm: 0.0,
            bbox: BoundingBox::new(0, 0, 0, 0),
            search_radius: search_radius.max(1),
            min_score,
        }
    }

    fn score_at(&self, gray: &[f32], frame_w: usize, frame_h: usize, x: i32, y: i32) -> f64 {
        let w = self.bbox.width as usize;
        let h = self.bbox.height as usize;

        if x < 0 || y < 0 || x as usize + w > frame_w || y as usize + h > frame_h {
            return f64::MIN;
        }

        let x = x as usize;
        let y = y as usize;

        let mut sum = 0.0f64;
        for row in 0..h {
            let offset = (y + row) * frame_w + x;
            for col in 0..w {
                sum += gray[offset + col] as f64;
            }
        }
        let mean = sum / (w * h) as f64;

        let mut cross = 0.0f64;
        let mut window_sq = 0.0f64;
        for row in 0..h {
            let offset = (y + row) * frame_w + x;
            for col in 0..w {
                let v = gray[offset + col] as f64 - mean;
                cross += v * self.template[row * w + col] as f64;
                window_sq += v * v;
            }
        }

        let denom = self.template_norm * window_sq.sqrt();
        if denom < f64::EPSILON {
            return 0.0;
        }
        cross / denom
    }
}

impl Default for NccTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_RADIUS, DEFAULT_MIN_SCORE)
    }
}

impl ObjectTracker for NccTracker {
    fn init(&mut self, frame: &Frame, bbox: BoundingBox) -> bool {
        let Some(crop) = frame.crop(&bbox) else {
            return false;
        };
        if crop.width() as i32 != bbox.width || crop.height() as i32 != bbox.height {
            // Box partially outside the frame; the clamped patch would not
            // match the box geometry on later updates.
            return false;
        }

        let gray = crop.luminance();
        let mean = gray.iter().map(|&v| v as f64).sum::<f64>() / gray.len() as f64;
        self.template = gray.iter().map(|&v| (v as f64 - mean) as f32).collect();
        self.template_norm = self
            .template
            .iter()
            .map(|&v| (v as f64) * (v as f64))
            .sum::<f64>()
            .sqrt();
        self.bbox = bbox;
        true
    }

    fn update(&mut self, frame: &Frame) -> Option<BoundingBox> {
        if self.template.is_empty() || self.template_norm < f64::EPSILON {
            return None;
        }

        let gray = frame.luminance();
        let frame_w = frame.width() as usize;
        let frame_h = frame.height() as usize;

        let mut best_score = f64::MIN;
        let mut best = (self.bbox.x, self.bbox.y);

        for dy in -self.search_radius..=self.search_radius {
            for dx in -self.search_radius..=self.search_radius {
                let score = self.score_at(
                    &gray,
                    frame_w,
                    frame_h,
                    self.bbox.x + dx,
                    self.bbox.y + dy,
                );
                if score > best_score {
                    best_score = score;
                    best = (self.bbox.x + dx, self.bbox.y + dy);
                }
            }
        }

        if best_score < self.min_score {
            return None;
        }

        self.bbox.x = best.0;
        self.bbox.y = best.1;
        Some(self.bbox)
    }
}
