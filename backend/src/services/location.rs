//! File-backed store for user-submitted locations
//!
//! The whole collection lives in one JSON array. Every operation opens, reads
//! or rewrites, and closes the file; there is no lock, so concurrent writers
//! race and the last one wins.

use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use shared::{filter_valid_entries, Location, LocationRecord};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize locations: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Location collection persisted as a single JSON file
#[derive(Debug, Clone)]
pub struct LocationStore {
    path: PathBuf,
}

impl LocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory holding the store file
    pub async fn ensure_parent_dir(&self) -> std::io::Result<()> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => tokio::fs::create_dir_all(dir).await,
            _ => Ok(()),
        }
    }

    /// Append a freshly stamped record
    ///
    /// Existing entries, including malformed legacy ones, are kept as they are.
    /// An unreadable or corrupt file fails the append instead of being
    /// overwritten.
    pub async fn append(&self, ip: &str, location: Location) -> Result<LocationRecord, StoreError> {
        let mut entries = self.read_entries().await?;
        let record = LocationRecord::stamped(ip, location, Local::now());
        entries.push(serde_json::to_value(&record)?);
        self.write_entries(&entries).await?;

        tracing::debug!(
            lat = record.location.coordinates.lat,
            lng = record.location.coordinates.lng,
            "Location appended"
        );
        Ok(record)
    }

    /// All entries with usable coordinates, in storage order and as stored
    ///
    /// Read failures are logged and reported as an empty collection.
    pub async fn list_valid(&self) -> Vec<Value> {
        match self.read_entries().await {
            Ok(entries) => filter_valid_entries(&entries),
            Err(e) => {
                tracing::warn!("Error loading locations: {}", e);
                Vec::new()
            }
        }
    }

    /// Overwrite the collection with the valid subset of `candidates`, each
    /// kept exactly as sent
    pub async fn replace_all(&self, candidates: &[Value]) -> Result<usize, StoreError> {
        let valid = filter_valid_entries(candidates);
        self.write_entries(&valid).await?;

        tracing::info!(
            kept = valid.len(),
            dropped = candidates.len() - valid.len(),
            "Locations replaced"
        );
        Ok(valid.len())
    }

    /// Overwrite the collection with an empty array
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.write_entries::<Value>(&[]).await?;
        tracing::info!("Locations cleared");
        Ok(())
    }

    /// Raw entries; a missing or empty file is an empty collection
    async fn read_entries(&self) -> Result<Vec<Value>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_entries<T: Serialize>(&self, entries: &[T]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(entries)?;

        let result = match self.ensure_parent_dir().await {
            Ok(()) => tokio::fs::write(&self.path, bytes).await,
            Err(e) => Err(e),
        };
        result.map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
