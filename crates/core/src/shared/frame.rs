use ndarray::ArrayView3;

use crate::shared::bbox::BoundingBox;

/// A single video/image frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the domain layer
/// treats pixel data as opaque.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the pixels under `bbox` (clamped to frame bounds) into a new frame.
    ///
    /// Returns `None` when the clamped region is empty.
    pub fn crop(&self, bbox: &BoundingBox) -> Option<Frame> {
        let x1 = bbox.x.max(0) as usize;
        let y1 = bbox.y.max(0) as usize;
        let x2 = (bbox.x + bbox.width).min(self.width as i32).max(0) as usize;
        let y2 = (bbox.y + bbox.height).min(self.height as i32).max(0) as usize;

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        let crop_w = x2 - x1;
        let crop_h = y2 - y1;
        let channels = self.channels as usize;

        let src = self.as_ndarray();
        let mut data = Vec::with_capacity(crop_w * crop_h * channels);
        for row in y1..y2 {
            for col in x1..x2 {
                for c in 0..channels {
                    data.push(src[[row, col, c]]);
                }
            }
        }

        Some(Frame::new(
            data,
            crop_w as u32,
            crop_h as u32,
            self.channels,
            self.index,
        ))
    }

    /// Rec. 601 grayscale, one `f32` per pixel in row-major order.
    ///
    /// Single-channel frames pass through unchanged.
    pub fn luminance(&self) -> Vec<f32> {
        let pixels = (self.width as usize) * (self.height as usize);
        if self.channels == 1 {
            return self.data.iter().map(|&v| v as f32).collect();
        }
        let ch = self.channels as usize;
        let mut gray = Vec::with_capacity(pixels);
        for i in 0..pixels {
            let offset = i * ch;
            let r = self.data[offset] as f32;
            let g = self.data[offset + 1] as f32;
            let b = self.data[offset + 2] as f32;
            gray.push(0.299 * r + 0.587 * g + 0.114 * b);
        }
        gray
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
