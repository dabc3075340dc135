use crate::shared::bbox::BoundingBox;
use crate::shared::constants::{DEFAULT_MIN_FACE_SIZE, DEFAULT_SHARPNESS_THRESHOLD};
use crate::shared::frame::Frame;

/// Scores a face crop in `[0, 1]` from its size and sharpness.
///
/// Pure and deterministic given identical pixel data; knows nothing about
/// identity or history. The dedup registry uses it to arbitrate which of
/// two crops of the same face is kept.
#[derive(Clone, Copy, Debug)]
pub struct QualityScorer {
    min_face_size: u32,
    sharpness_threshold: f64,
}

impl QualityScorer {
    pub fn new(min_face_size: u32, sharpness_threshold: f64) -> Self {
        Self {
            min_face_size,
            sharpness_threshold,
        }
    }

    /// Combined quality: `0.6 * size + 0.4 * sharpness`.
    ///
    /// An empty crop scores 0. A crop the sharpness operator cannot be
    /// applied to (smaller than 3x3) contributes 0 on the sharpness term;
    /// use [`sharpness`](Self::sharpness) directly to tell that apart from
    /// a genuinely blurred crop.
    pub fn score(&self, crop: &Frame, bbox: &BoundingBox) -> f64 {
        if crop.is_empty() {
            return 0.0;
        }

        let size_score = self.size_score(bbox);
        let sharpness_score = Self::sharpness(crop)
            .map(|variance| (variance / self.sharpness_threshold).min(1.0))
            .unwrap_or(0.0);

        0.6 * size_score + 0.4 * sharpness_score
    }

    /// Size term: saturates at 1 once the box area reaches four times the
    /// minimum face area (twice the minimum linear size in each dimension).
    fn size_score(&self, bbox: &BoundingBox) -> f64 {
        let min_area = (self.min_face_size as f64) * (self.min_face_size as f64);
        (bbox.area().max(0.0) / (4.0 * min_area)).min(1.0)
    }

    /// Variance of the 4-neighbor Laplacian over the grayscale crop, a
    /// standard blur proxy: in-focus images produce high-variance edge
    /// response.
    ///
    /// `None` when the crop is too small for the operator, as distinct
    /// from a computed variance of 0 on a flat crop.
    pub fn sharpness(crop: &Frame) -> Option<f64> {
        let w = crop.width() as usize;
        let h = crop.height() as usize;
        if w < 3 || h < 3 {
            return None;
        }

        let gray = crop.luminance();
        let mut responses = Vec::with_capacity((w - 2) * (h - 2));
        for row in 1..h - 1 {
            for col in 1..w - 1 {
                let center = gray[row * w + col] as f64;
                let up = gray[(row - 1) * w + col] as f64;
                let down = gray[(row + 1) * w + col] as f64;
                let left = gray[row * w + col - 1] as f64;
                let right = gray[row * w + col + 1] as f64;
                responses.push(4.0 * center - up - down - left - right);
            }
        }

        let n = responses.len() as f64;
        let mean = responses.iter().sum::<f64>() / n;
        let variance = responses.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n;
        Some(variance)
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FACE_SIZE, DEFAULT_SHARPNESS_THRESHOLD)
    }
}
