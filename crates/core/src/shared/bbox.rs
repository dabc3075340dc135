use serde::{Deserialize, Serialize};

/// An axis-aligned box in pixel space, stored as top-left corner plus size.
///
/// This is the geometry every component exchanges: detector output, track
/// positions, and crop regions all use the same `(x, y, w, h)` convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    /// Intersection-over-union with another box, in `[0, 1]`.
    ///
    /// Returns 0 for disjoint boxes and for degenerate boxes whose union
    /// area is zero.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let union = self.area() + other.area() - inter;
        if union == 0.0 {
            return 0.0;
        }
        inter / union
    }

    /// Expands the box by `padding` pixels on each side, clipped to
    /// `frame_width` × `frame_height`.
    ///
    /// Returns `None` when the clipped region is empty (box entirely
    /// outside the frame, or degenerate).
    pub fn expanded(&self, padding: u32, frame_width: u32, frame_height: u32) -> Option<Self> {
        let pad = padding as i32;
        let x1 = (self.x - pad).max(0);
        let y1 = (self.y - pad).max(0);
        let x2 = (self.x + self.width + pad).min(frame_width as i32);
        let y2 = (self.y + self.height + pad).min(frame_height as i32);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self::new(x1, y1, x2 - x1, y2 - y1))
    }
}
