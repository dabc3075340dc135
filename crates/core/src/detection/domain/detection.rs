use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::shared::bbox::BoundingBox;

/// One-shot localization of a face in a single frame.
///
/// Produced by a detection pass and consumed immediately; tracks and
/// catalog records are the durable artifacts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub confidence: f64,
    /// Named landmarks (e.g. "left_eye") in frame pixel coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypoints: Option<BTreeMap<String, (i32, i32)>>,
}

impl Detection {
    /// Boundary confidence filter: keeps detections strictly above `threshold`,
    /// preserving detector output order.
    pub fn filter_confident(detections: Vec<Detection>, threshold: f64) -> Vec<Detection> {
        detections
            .into_iter()
            .filter(|d| d.confidence > threshold)
            .collect()
    }
}
