use serde::{Deserialize, Serialize};

use crate::tracking::domain::object_tracker::ObjectTracker;
use crate::tracking::infrastructure::meanshift_tracker::MeanShiftTracker;
use crate::tracking::infrastructure::ncc_tracker::NccTracker;

/// Selects the tracking algorithm used for newly admitted tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerKind {
    Ncc,
    MeanShift,
}

impl TrackerKind {
    pub const ALL: &[TrackerKind] = &[TrackerKind::Ncc, TrackerKind::MeanShift];
}

impl std::fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerKind::Ncc => write!(f, "ncc"),
            TrackerKind::MeanShift => write!(f, "meanshift"),
        }
    }
}

impl std::str::FromStr for TrackerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ncc" => Ok(TrackerKind::Ncc),
            "meanshift" => Ok(TrackerKind::MeanShift),
            other => Err(format!(
                "unknown tracker kind {other:?}, expected one of: ncc, meanshift"
            )),
        }
    }
}

pub fn create_tracker(kind: TrackerKind) -> Box<dyn ObjectTracker> {
    match kind {
        TrackerKind::Ncc => Box::new(NccTracker::default()),
        TrackerKind::MeanShift => Box::new(MeanShiftTracker::default()),
    }
}
