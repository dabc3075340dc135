use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::catalog::domain::catalog_store::CatalogStore;
use crate::catalog::domain::face_record::{Catalog, FaceRecord};
use crate::catalog::domain::quality::QualityScorer;
use crate::catalog::infrastructure::descriptor_pool::DescriptorPool;
use crate::shared::bbox::BoundingBox;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Result of offering one observed face to the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceOutcome {
    /// A new identity was added to the catalog.
    Created { face_id: u64 },
    /// The face matched an existing identity (whose stored image may or
    /// may not have been replaced).
    Known { face_id: u64 },
    /// The observation was dropped: degenerate crop or failed descriptor.
    Skipped,
}

/// Deduplicates observed faces into a catalog keeping the single
/// best-quality image per distinct identity.
///
/// New-vs-known is decided by nearest-neighbor cosine similarity over the
/// catalog; replace-vs-keep by a strictly-greater quality comparison. The
/// registry is the single writer of the backing store, and one mutex
/// serializes counter allocation, record mutation, and persistence.
pub struct DedupRegistry {
    catalog: Mutex<Catalog>,
    store: Box<dyn CatalogStore>,
    image_writer: Box<dyn ImageWriter>,
    pool: DescriptorPool,
    scorer: QualityScorer,
    similarity_threshold: f64,
    padding: u32,
    output_dir: PathBuf,
}

impl DedupRegistry {
    /// Builds the registry, restoring any previously persisted catalog.
    ///
    /// A load failure is absorbed: the registry starts empty and the run
    /// continues (prior images on disk stay untouched until replaced).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Box<dyn CatalogStore>,
        image_writer: Box<dyn ImageWriter>,
        pool: DescriptorPool,
        scorer: QualityScorer,
        similarity_threshold: f64,
        padding: u32,
        output_dir: PathBuf,
    ) -> Self {
        let catalog = match store.load() {
            Ok(Some(catalog)) => {
                log::info!("loaded {} known faces from catalog", catalog.len());
                catalog
            }
            Ok(None) => Catalog::default(),
            Err(e) => {
                log::warn!("failed to load catalog, starting empty: {e}");
                Catalog::default()
            }
        };

        Self {
            catalog: Mutex::new(catalog),
            store,
            image_writer,
            pool,
            scorer,
            similarity_threshold,
            padding,
            output_dir,
        }
    }

    /// Expands `bbox` by the configured padding, clipped to the frame.
    ///
    /// `None` when the clipped region is empty.
    pub fn extract_crop(&self, frame: &Frame, bbox: &BoundingBox) -> Option<Frame> {
        bbox.expanded(self.padding, frame.width(), frame.height())
            .and_then(|expanded| frame.crop(&expanded))
    }

    /// Offers one observed face for deduplication.
    ///
    /// Blocks on the descriptor pool; pool timeout and extraction failure
    /// are absorbed as [`FaceOutcome::Skipped`]. All catalog reads and
    /// writes for this observation happen under one critical section.
    pub fn process(&self, frame: &Frame, bbox: &BoundingBox, timestamp: DateTime<Utc>) -> FaceOutcome {
        let Some(crop) = self.extract_crop(frame, bbox) else {
            log::debug!("degenerate crop at {bbox:?}, skipping");
            return FaceOutcome::Skipped;
        };

        let descriptor = match self.pool.extract(crop.clone()) {
            Ok(Some(descriptor)) => descriptor,
            Ok(None) => {
                log::debug!("descriptor unavailable for crop at {bbox:?}, skipping");
                return FaceOutcome::Skipped;
            }
            Err(e) => {
                log::warn!("descriptor extraction failed: {e}");
                return FaceOutcome::Skipped;
            }
        };

        let mut catalog = self
            .catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let matched = catalog
            .best_match(&descriptor)
            .filter(|(_, similarity)| *similarity > self.similarity_threshold);

        match matched {
            Some((index, similarity)) => {
                let quality = self.scorer.score(&crop, bbox);
                self.refresh_record(&mut catalog, index, similarity, &crop, descriptor, quality)
            }
            None => {
                let quality = self.scorer.score(&crop, bbox);
                self.create_record(&mut catalog, &crop, descriptor, quality, timestamp)
            }
        }
    }

    /// Known-face path: replace the stored representative only when the
    /// new crop scores strictly higher.
    fn refresh_record(
        &self,
        catalog: &mut Catalog,
        index: usize,
        similarity: f64,
        crop: &Frame,
        descriptor: Vec<f32>,
        quality: f64,
    ) -> FaceOutcome {
        let record = &catalog.records[index];
        let face_id = record.face_id;

        if quality <= record.quality {
            log::debug!(
                "face {face_id} matched (similarity {similarity:.3}), keeping stored quality {:.3} over {quality:.3}",
                record.quality
            );
            return FaceOutcome::Known { face_id };
        }

        let filename = face_filename(face_id);
        let path = self.output_dir.join(&filename);
        if let Err(e) = self.image_writer.write(&path, crop, None) {
            log::warn!("failed to write replacement image for face {face_id}: {e}");
            return FaceOutcome::Known { face_id };
        }

        let previous_filename = catalog.records[index].filename.clone();
        if previous_filename != filename {
            let old_path = self.output_dir.join(&previous_filename);
            if let Err(e) = std::fs::remove_file(&old_path) {
                log::warn!("failed to remove replaced image {}: {e}", old_path.display());
            }
        }

        let record = &mut catalog.records[index];
        record.descriptor = descriptor;
        record.quality = quality;
        record.filename = filename;
        log::info!("face {face_id} refreshed with higher-quality crop ({quality:.3})");

        self.persist(catalog);
        FaceOutcome::Known { face_id }
    }

    /// New-face path: allocate an id, store the image, append the record.
    fn create_record(
        &self,
        catalog: &mut Catalog,
        crop: &Frame,
        descriptor: Vec<f32>,
        quality: f64,
        timestamp: DateTime<Utc>,
    ) -> FaceOutcome {
        let face_id = catalog.next_face_id();
        let filename = face_filename(face_id);
        let path = self.output_dir.join(&filename);

        if let Err(e) = self.image_writer.write(&path, crop, None) {
            // The id stays consumed; ids are never reused.
            log::warn!("failed to store image for new face {face_id}: {e}");
            return FaceOutcome::Skipped;
        }

        catalog.records.push(FaceRecord {
            face_id,
            filename,
            first_seen: timestamp,
            descriptor,
            quality,
        });
        log::info!("new face {face_id} cataloged (quality {quality:.3})");

        self.persist(catalog);
        FaceOutcome::Created { face_id }
    }

    /// Save failure leaves the in-memory catalog authoritative until the
    /// next successful save.
    fn persist(&self, catalog: &Catalog) {
        if let Err(e) = self.store.save(catalog) {
            log::warn!("failed to persist catalog: {e}");
        }
    }

    pub fn known_faces(&self) -> usize {
        self.catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn face_counter(&self) -> u64 {
        self.catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .face_counter
    }

    /// Copy of the current catalog state.
    pub fn snapshot(&self) -> Catalog {
        self.catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn face_filename(face_id: u64) -> String {
    format!("face_{face_id:03}.jpg")
}
