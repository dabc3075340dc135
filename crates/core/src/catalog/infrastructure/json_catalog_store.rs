use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::domain::catalog_store::CatalogStore;
use crate::catalog::domain::face_record::{Catalog, FaceRecord};

#[derive(Error, Debug)]
pub enum CatalogStoreError {
    #[error("failed to read catalog from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write catalog to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// On-disk document: the catalog plus a write timestamp.
#[derive(Serialize, Deserialize)]
struct CatalogFile {
    records: Vec<FaceRecord>,
    face_counter: u64,
    last_updated: DateTime<Utc>,
}

/// Full-file JSON persistence for the catalog.
///
/// Every save serializes the complete document to a sibling temp file and
/// renames it over the target, so a crash mid-write never leaves a
/// corrupt catalog behind. A malformed existing file is absorbed as "no
/// prior data" with a warning rather than failing the run.
pub struct JsonCatalogStore {
    path: PathBuf,
}

impl JsonCatalogStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CatalogStore for JsonCatalogStore {
    fn load(&self) -> Result<Option<Catalog>, Box<dyn std::error::Error>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Box::new(CatalogStoreError::Read {
                    path: self.path.clone(),
                    source: e,
                }))
            }
        };

        match serde_json::from_str::<CatalogFile>(&text) {
            Ok(file) => Ok(Some(Catalog {
                records: file.records,
                face_counter: file.face_counter,
            })),
            Err(e) => {
                log::warn!(
                    "malformed catalog file {}, starting empty: {e}",
                    self.path.display()
                );
                Ok(None)
            }
        }
    }

    fn save(&self, catalog: &Catalog) -> Result<(), Box<dyn std::error::Error>> {
        let document = CatalogFile {
            records: catalog.records.clone(),
            face_counter: catalog.face_counter,
            last_updated: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&document).map_err(CatalogStoreError::Serialize)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CatalogStoreError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json).map_err(|e| CatalogStoreError::Write {
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| CatalogStoreError::Write {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(face_id: u64) -> FaceRecord {
        FaceRecord {
            face_id,
            filename: format!("face_{face_id:03}.jpg"),
            first_seen: Utc::now(),
            descriptor: vec![0.5, 0.25, 0.25],
            quality: 0.42,
        }
    }

    #[test]
    fn test_load_missing_file_is_no_prior_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCatalogStore::new(dir.path().join("catalog.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCatalogStore::new(dir.path().join("catalog.json"));

        let catalog = Catalog {
            records: vec![record(1), record(2)],
            face_counter: 2,
        };
        store.save(&catalog).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_counter_survives_roundtrip_independent_of_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCatalogStore::new(dir.path().join("catalog.json"));

        let catalog = Catalog {
            records: vec![record(9)],
            face_counter: 9,
        };
        store.save(&catalog).unwrap();
        assert_eq!(store.load().unwrap().unwrap().face_counter, 9);
    }

    #[test]
    fn test_malformed_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{ definitely not a catalog").unwrap();

        let store = JsonCatalogStore::new(path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let store = JsonCatalogStore::new(path.clone());

        store.save(&Catalog::default()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.json");
        let store = JsonCatalogStore::new(path.clone());

        store.save(&Catalog::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_overwrites_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCatalogStore::new(dir.path().join("catalog.json"));

        store
            .save(&Catalog {
                records: vec![record(1)],
                face_counter: 1,
            })
            .unwrap();
        store
            .save(&Catalog {
                records: vec![record(1), record(2)],
                face_counter: 2,
            })
            .unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.face_counter, 2);
    }
}
