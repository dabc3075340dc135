use crate::shared::frame::Frame;

/// Fixed-length appearance summary of a face crop, used for similarity
/// search against the catalog.
pub type Descriptor = Vec<f32>;

/// Domain interface for turning a face crop into a descriptor.
///
/// Implementations must be pure with respect to the pixel data; the worker
/// pool calls them from multiple threads.
pub trait DescriptorExtractor: Send + Sync {
    /// `None` on an empty or otherwise unusable crop.
    fn extract(&self, crop: &Frame) -> Option<Descriptor>;
}

/// Cosine similarity between two descriptors: `dot(u, v) / (‖u‖·‖v‖)`.
///
/// Defined as 0 when either norm is 0. Vectors of unequal length are
/// compared over their common prefix.
pub fn cosine_similarity(u: &[f32], v: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_u = 0.0f64;
    let mut norm_v = 0.0f64;

    for (&a, &b) in u.iter().zip(v.iter()) {
        dot += a as f64 * b as f64;
    }
    for &a in u {
        norm_u += a as f64 * a as f64;
    }
    for &b in v {
        norm_v += b as f64 * b as f64;
    }

    let denom = norm_u.sqrt() * norm_v.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    dot / denom
}
