//! Reading provider abstraction
//!
//! The analytics never talk to a data source directly. A hosting
//! application hands in something that can produce the current batch of raw
//! records; how those records were obtained (live subscription, polling,
//! storage reads) stays on the caller's side of this trait.

use crate::error::{AnalyticsError, Result};
use crate::reading::{parse_snapshot, RawReading};

/// Source of raw reading records.
pub trait ReadingProvider {
    /// Return the current snapshot of raw records, in any order.
    fn fetch(&self) -> Result<Vec<RawReading>>;
}

impl<F> ReadingProvider for F
where
    F: Fn() -> Result<Vec<RawReading>>,
{
    fn fetch(&self) -> Result<Vec<RawReading>> {
        self()
    }
}

/// Provider over records held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    records: Vec<RawReading>,
}

impl MemoryProvider {
    pub fn new(records: Vec<RawReading>) -> Self {
        Self { records }
    }

    /// Append a record, e.g. from a push callback.
    pub fn push(&mut self, record: RawReading) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ReadingProvider for MemoryProvider {
    fn fetch(&self) -> Result<Vec<RawReading>> {
        Ok(self.records.clone())
    }
}

/// Provider over a keyed JSON snapshot, as exported by a realtime database.
#[derive(Debug, Clone)]
pub struct JsonSnapshotProvider {
    json: String,
}

impl JsonSnapshotProvider {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }

    /// Read the snapshot from a file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| AnalyticsError::Provider(format!("{}: {}", path.display(), e)))?;
        Ok(Self { json })
    }
}

impl ReadingProvider for JsonSnapshotProvider {
    fn fetch(&self) -> Result<Vec<RawReading>> {
        Ok(parse_snapshot(&self.json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_memory_provider() {
        let mut provider = MemoryProvider::default();
        assert!(provider.is_empty());
        provider.push(RawReading::new("a", "2025-03-01_10-00-00").with_value("uv_index", 2.0));
        assert_eq!(provider.fetch().unwrap().len(), 1);
    }

    #[test]
    fn test_closure_provider() {
        let provider = || -> Result<Vec<RawReading>> {
            Ok(vec![RawReading::new("a", 1_706_745_600_000_i64)])
        };
        assert_eq!(provider.fetch().unwrap()[0].id, "a");

        let failing = || -> Result<Vec<RawReading>> {
            Err(AnalyticsError::Provider("feed offline".to_string()))
        };
        assert!(matches!(failing.fetch(), Err(AnalyticsError::Provider(_))));
    }

    #[test]
    fn test_json_snapshot_provider() {
        let provider = JsonSnapshotProvider::new(
            r#"{ "k1": { "timestamp": "2025-03-01_10-00-00", "pressure": 1012.5 } }"#,
        );
        let records = provider.fetch().unwrap();
        assert_eq!(records[0].id, "k1");

        let broken = JsonSnapshotProvider::new("[1, 2");
        assert!(matches!(broken.fetch(), Err(AnalyticsError::Parse(_))));
    }

    #[test]
    fn test_json_snapshot_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "k1": {{ "timestamp": "2025-03-01_10-00-00", "altitude": 412 }} }}"#
        )
        .unwrap();
        let provider = JsonSnapshotProvider::from_file(file.path()).unwrap();
        assert_eq!(provider.fetch().unwrap().len(), 1);

        assert!(JsonSnapshotProvider::from_file("/nonexistent/snapshot.json").is_err());
    }
}
