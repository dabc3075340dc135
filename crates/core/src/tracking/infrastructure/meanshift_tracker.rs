use crate::shared::bbox::BoundingBox;
use crate::shared::frame::Frame;
use crate::tracking::domain::object_tracker::ObjectTracker;

pub const DEFAULT_MIN_MASS: f64 = 0.1;

const HUE_BINS: usize = 32;
const SAT_BINS: usize = 32;
const MAX_ITERATIONS: usize = 10;

/// Color tracker using histogram back-projection and mean shift.
///
/// Models the target as a 2D hue-saturation histogram and, each frame,
/// shifts the window toward the centroid of back-projected weight until it
/// converges. The target counts as lost when the mean back-projected
/// weight inside the window drops below `min_mass`.
pub struct MeanShiftTracker {
    histogram: Vec<f64>,
    bbox: BoundingBox,
    min_mass: f64,
}

impl MeanShiftTracker {
    pub fn new(min_mass: f64) -> Self {
        Self {
            histogram: Vec::new(),
            bbox: BoundingBox::new(0, 0, 0, 0),
            min_mass,
        }
    }

    /// Back-projected weight of the pixel at `(col, row)`.
    fn weight_at(&self, frame: &Frame, col: usize, row: usize) -> f64 {
        let offset = (row * frame.width() as usize + col) * frame.channels() as usize;
        let data = frame.data();
        let r = data[offset] as f64 / 255.0;
        let g = data[offset + 1] as f64 / 255.0;
        let b = data[offset + 2] as f64 / 255.0;
        self.histogram[hs_bin(r, g, b)]
    }

    /// One mean-shift step: weighted centroid of the window, plus the mean
    /// weight used for the loss check.
    fn centroid(&self, frame: &Frame, bbox: &BoundingBox) -> (f64, f64, f64) {
        let x1 = bbox.x.max(0) as usize;
        let y1 = bbox.y.max(0) as usize;
        let x2 = (bbox.x + bbox.width).min(frame.width() as i32).max(0) as usize;
        let y2 = (bbox.y + bbox.height).min(frame.height() as i32).max(0) as usize;

        if x2 <= x1 || y2 <= y1 {
            return (0.0, 0.0, 0.0);
        }

        let mut total = 0.0;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        for row in y1..y2 {
            for col in x1..x2 {
                let w = self.weight_at(frame, col, row);
                total += w;
                sum_x += w * col as f64;
                sum_y += w * row as f64;
            }
        }

        let area = ((x2 - x1) * (y2 - y1)) as f64;
        if total == 0.0 {
            return (0.0, 0.0, 0.0);
        }
        (sum_x / total, sum_y / total, total / area)
    }
}

impl Default for MeanShiftTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MASS)
    }
}

impl ObjectTracker for MeanShiftTracker {
    fn init(&mut self, frame: &Frame, bbox: BoundingBox) -> bool {
        if frame.channels() != 3 {
            return false;
        }
        let Some(crop) = frame.crop(&bbox) else {
            return false;
        };

        let mut histogram = vec![0.0f64; HUE_BINS * SAT_BINS];
        let data = crop.data();
        let pixels = (crop.width() * crop.height()) as usize;
        let ch = crop.channels() as usize;
        for i in 0..pixels {
            let offset = i * ch;
            let r = data[offset] as f64 / 255.0;
            let g = data[offset + 1] as f64 / 255.0;
            let b = data[offset + 2] as f64 / 255.0;
            histogram[hs_bin(r, g, b)] += 1.0;
        }
        for v in &mut histogram {
            *v /= pixels as f64;
        }

        self.histogram = histogram;
        self.bbox = bbox;
        true
    }

    fn update(&mut self, frame: &Frame) -> Option<BoundingBox> {
        if self.histogram.is_empty() || frame.channels() != 3 {
            return None;
        }

        let mut bbox = self.bbox;
        let mut mass = 0.0;

        for _ in 0..MAX_ITERATIONS {
            let (cx, cy, mean_weight) = self.centroid(frame, &bbox);
            mass = mean_weight;
            if mean_weight == 0.0 {
                break;
            }

            let new_x = (cx - bbox.width as f64 / 2.0).round() as i32;
            let new_y = (cy - bbox.height as f64 / 2.0).round() as i32;
            let shift = (new_x - bbox.x).abs().max((new_y - bbox.y).abs());
            bbox.x = new_x;
            bbox.y = new_y;
            if shift < 1 {
                break;
            }
        }

        if mass < self.min_mass {
            return None;
        }

        self.bbox = bbox;
        Some(bbox)
    }
}

fn hs_bin(r: f64, g: f64, b: f64) -> usize {
    let (h, s, _v) = rgb_to_hsv(r, g, b);
    let h_bin = ((h / 360.0) * HUE_BINS as f64).min(HUE_BINS as f64 - 1.0) as usize;
    let s_bin = (s * SAT_BINS as f64).min(SAT_BINS as f64 - 1.0) as usize;
    h_bin * SAT_BINS + s_bin
}

fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else if (max - r).abs() < f64::EPSILON {
        60.0 * (((g - b) / delta) % 6.0)
    } else if (max - g).abs() < f64::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };

    (h, s, v)
}
