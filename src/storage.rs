//! JSON data file with scratch/seed precedence
//!
//! Load order: the writable scratch file if it exists and parses, then the
//! read-only seed file, then an empty document. Saves always go to the
//! scratch file.
//!
//! Array entries that do not match the expected shape are kept verbatim as
//! [`Record::Raw`] so one bad record never hides the others and a save
//! writes it back unchanged.

use crate::bookings::Booking;
use crate::catalog::Destination;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// One array entry of the data file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record<T> {
    Parsed(T),
    Raw(Value),
}

impl<T> Record<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Raw(_) => None,
        }
    }
}

impl Record<Booking> {
    /// The booking id, read from the raw object when the record did not parse
    pub fn booking_id(&self) -> Option<&str> {
        match self {
            Self::Parsed(booking) => Some(&booking.id),
            Self::Raw(raw) => raw.get("id").and_then(Value::as_str),
        }
    }
}

/// Persisted document shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataDocument {
    #[serde(default)]
    pub destinations: Vec<Record<Destination>>,
    #[serde(default)]
    pub bookings: Vec<Record<Booking>>,
}

impl DataDocument {
    /// Destinations that parsed
    pub fn valid_destinations(&self) -> Vec<Destination> {
        self.destinations
            .iter()
            .filter_map(Record::parsed)
            .cloned()
            .collect()
    }

    /// Bookings that parsed
    pub fn valid_bookings(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.iter().filter_map(Record::parsed)
    }

    fn warn_unrecognized(&self, path: &Path) {
        let bad_destinations = self.destinations.len() - self.valid_destinations().len();
        let bad_bookings = self.bookings.len() - self.valid_bookings().count();
        if bad_destinations + bad_bookings > 0 {
            tracing::warn!(
                path = %path.display(),
                bad_destinations,
                bad_bookings,
                "Keeping unrecognized records verbatim"
            );
        }
    }
}

/// Where the document was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Scratch,
    Seed,
    Empty,
}

/// Scratch + seed file pair
#[derive(Debug, Clone)]
pub struct DataFile {
    scratch: PathBuf,
    seed: PathBuf,
}

impl DataFile {
    pub fn new(scratch: impl Into<PathBuf>, seed: impl Into<PathBuf>) -> Self {
        Self {
            scratch: scratch.into(),
            seed: seed.into(),
        }
    }

    pub fn scratch_path(&self) -> &Path {
        &self.scratch
    }

    pub fn seed_path(&self) -> &Path {
        &self.seed
    }

    /// Load following scratch → seed → empty precedence.
    pub async fn load(&self) -> (DataDocument, DataSource) {
        if self.scratch.exists() {
            match read_document(&self.scratch).await {
                Ok(doc) => return (doc, DataSource::Scratch),
                Err(e) => tracing::warn!(
                    path = %self.scratch.display(),
                    "Ignoring unreadable scratch data file: {}",
                    e
                ),
            }
        }

        match read_document(&self.seed).await {
            Ok(doc) => (doc, DataSource::Seed),
            Err(e) => {
                tracing::info!(
                    path = %self.seed.display(),
                    "No seed data file ({}); starting empty",
                    e
                );
                (DataDocument::default(), DataSource::Empty)
            }
        }
    }

    /// Write the document to the scratch file.
    pub async fn save(&self, doc: &DataDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)?;
        tokio::fs::write(&self.scratch, json).await.map_err(|e| {
            Error::Storage(format!("Cannot write {}: {}", self.scratch.display(), e))
        })
    }
}

async fn read_document(path: &Path) -> Result<DataDocument> {
    let data = tokio::fs::read_to_string(path).await?;
    let doc: DataDocument = serde_json::from_str(&data)?;
    doc.warn_unrecognized(path);
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn files(dir: &TempDir) -> DataFile {
        DataFile::new(dir.path().join("scratch.json"), dir.path().join("seed.json"))
    }

    #[tokio::test]
    async fn test_load_empty_when_nothing_exists() {
        let dir = TempDir::new().unwrap();
        let (doc, source) = files(&dir).load().await;
        assert_eq!(source, DataSource::Empty);
        assert_eq!(doc, DataDocument::default());
    }

    #[tokio::test]
    async fn test_seed_used_without_scratch() {
        let dir = TempDir::new().unwrap();
        let data = files(&dir);
        std::fs::write(data.seed_path(), r#"{"destinations": []}"#).unwrap();

        let (doc, source) = data.load().await;
        assert_eq!(source, DataSource::Seed);
        assert!(doc.bookings.is_empty());
    }

    #[tokio::test]
    async fn test_scratch_takes_precedence() {
        let dir = TempDir::new().unwrap();
        let data = files(&dir);
        std::fs::write(data.seed_path(), r#"{"bookings": []}"#).unwrap();
        std::fs::write(
            data.scratch_path(),
            r#"{"bookings": [{"id":"BK0001","tripId":1,"customerName":"A","customerEmail":"a@b.it","guests":1,"notes":"","bookingDate":"2026-01-01T10:00:00","status":"confirmed"}]}"#,
        )
        .unwrap();

        let (doc, source) = data.load().await;
        assert_eq!(source, DataSource::Scratch);
        assert_eq!(doc.bookings.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_booking_record_is_kept_verbatim() {
        let dir = TempDir::new().unwrap();
        let data = files(&dir);
        std::fs::write(
            data.scratch_path(),
            r#"{"bookings": [
                {"id":"BK0001","tripId":1,"customerName":"A","customerEmail":"a@b.it","guests":1,"notes":"","bookingDate":"2026-01-01T10:00:00","status":"confirmed"},
                {"id":"BK0002","tripId":null,"customerName":null,"customerEmail":"b@c.it","guests":2,"bookingDate":"2026-01-02T10:00:00","status":"confirmed"}
            ]}"#,
        )
        .unwrap();

        let (doc, source) = data.load().await;
        assert_eq!(source, DataSource::Scratch);
        assert_eq!(doc.bookings.len(), 2);
        assert_eq!(doc.valid_bookings().count(), 1);
        assert!(matches!(doc.bookings[1], Record::Raw(_)));
        assert_eq!(doc.bookings[1].booking_id(), Some("BK0002"));

        data.save(&doc).await.unwrap();
        let saved: Value =
            serde_json::from_str(&std::fs::read_to_string(data.scratch_path()).unwrap()).unwrap();
        assert_eq!(saved["bookings"][1]["tripId"], Value::Null);
        assert_eq!(saved["bookings"][1]["customerEmail"], "b@c.it");
    }

    #[tokio::test]
    async fn test_bad_destination_is_skipped() {
        let dir = TempDir::new().unwrap();
        let data = files(&dir);
        std::fs::write(
            data.seed_path(),
            r##"{"destinations": [
                {"id":7,"name":"Oslo","lat":59.9,"lng":10.7,"color":"#123456","price":1500,"description":"Fiordi"},
                {"id":8,"name":"Senza coordinate"}
            ]}"##,
        )
        .unwrap();

        let (doc, _) = data.load().await;
        let valid = doc.valid_destinations();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].name, "Oslo");
    }

    #[tokio::test]
    async fn test_corrupt_scratch_falls_back_to_seed() {
        let dir = TempDir::new().unwrap();
        let data = files(&dir);
        std::fs::write(data.scratch_path(), "{not json").unwrap();
        std::fs::write(data.seed_path(), "{}").unwrap();

        let (_, source) = data.load().await;
        assert_eq!(source, DataSource::Seed);
    }

    #[tokio::test]
    async fn test_save_writes_scratch_only() {
        let dir = TempDir::new().unwrap();
        let data = files(&dir);
        data.save(&DataDocument::default()).await.unwrap();

        assert!(data.scratch_path().exists());
        assert!(!data.seed_path().exists());
        let (_, source) = data.load().await;
        assert_eq!(source, DataSource::Scratch);
    }

    #[tokio::test]
    async fn test_save_to_missing_directory_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let data = DataFile::new(dir.path().join("missing/scratch.json"), dir.path().join("seed.json"));
        let err = data.save(&DataDocument::default()).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
