use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::domain::descriptor::{cosine_similarity, Descriptor};

/// One known identity: the best-quality representative observed so far.
///
/// Mutated in place only when a later crop of the same face scores a
/// strictly higher quality; never deleted by normal operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub face_id: u64,
    pub filename: String,
    pub first_seen: DateTime<Utc>,
    pub descriptor: Descriptor,
    pub quality: f64,
}

/// The persistent set of known faces plus the id counter.
///
/// Records stay in insertion order; similarity search scans them in that
/// order and resolves ties to the first record encountered. `face_counter`
/// equals the maximum face id ever assigned; it survives save/load round
/// trips and never regresses, even when records are lost.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub records: Vec<FaceRecord>,
    pub face_counter: u64,
}

impl Catalog {
    /// Allocates the next face id. Ids start at 1 and are never reused.
    pub fn next_face_id(&mut self) -> u64 {
        self.face_counter += 1;
        self.face_counter
    }

    /// Index and similarity of the record most similar to `descriptor`.
    ///
    /// Scans insertion order keeping the strictly greatest similarity, so
    /// the first record encountered wins among equal maxima. `None` for an
    /// empty catalog.
    pub fn best_match(&self, descriptor: &[f32]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (index, record) in self.records.iter().enumerate() {
            let similarity = cosine_similarity(descriptor, &record.descriptor);
            if best.map_or(true, |(_, s)| similarity > s) {
                best = Some((index, similarity));
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
