use crate::catalog::domain::face_record::Catalog;

/// Persistence port for the face catalog.
///
/// The dedup registry is the single writer; implementations persist the
/// full catalog on every call rather than appending incrementally.
pub trait CatalogStore: Send {
    /// Loads the previously persisted catalog.
    ///
    /// `Ok(None)` means no usable prior data, including a malformed file,
    /// which implementations absorb rather than surface; the registry
    /// starts empty in that case.
    fn load(&self) -> Result<Option<Catalog>, Box<dyn std::error::Error>>;

    /// Persists the full catalog.
    fn save(&self, catalog: &Catalog) -> Result<(), Box<dyn std::error::Error>>;
}
