/// Color-histogram face descriptor.
///
/// A fast appearance summary with no ML model: the crop is resized to a
/// canonical square, a histogram is taken over each RGB channel, each
/// channel histogram is L2-normalized independently, and the three are
/// concatenated into one fixed-length vector.
use image::imageops::FilterType;

use crate::catalog::domain::descriptor::{Descriptor, DescriptorExtractor};
use crate::shared::frame::Frame;

/// Canonical crop edge before histogramming.
pub const CANONICAL_SIZE: u32 = 100;

/// Bins per color channel; descriptor length is three times this.
pub const BINS_PER_CHANNEL: usize = 64;

pub struct HistogramDescriptorExtractor;

impl HistogramDescriptorExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HistogramDescriptorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorExtractor for HistogramDescriptorExtractor {
    fn extract(&self, crop: &Frame) -> Option<Descriptor> {
        if crop.is_empty() || crop.channels() != 3 {
            return None;
        }

        let img = image::RgbImage::from_raw(crop.width(), crop.height(), crop.data().to_vec())?;
        let resized = image::imageops::resize(&img, CANONICAL_SIZE, CANONICAL_SIZE, FilterType::Triangle);

        let mut descriptor = Vec::with_capacity(3 * BINS_PER_CHANNEL);
        for channel in 0..3 {
            let mut hist = vec![0.0f32; BINS_PER_CHANNEL];
            for pixel in resized.pixels() {
                // 256 values over 64 bins: 4 per bin
                hist[(pixel[channel] >> 2) as usize] += 1.0;
            }

            let norm = hist.iter().map(|v| v * v).sum::<f32>().sqrt();
            if norm > 0.0 {
                for v in &mut hist {
                    *v /= norm;
                }
            }
            descriptor.extend_from_slice(&hist);
        }

        Some(descriptor)
    }
}
