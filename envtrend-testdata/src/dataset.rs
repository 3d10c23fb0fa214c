// Envtrend Testdata - Dataset structures
// Copyright (c) 2025 Envtrend Contributors
//
// Dual-licensed under MIT or Apache-2.0, at your option.

//! Generated station feed and its snapshot export.

use envtrend::reading::parse_snapshot;
use envtrend::{MemoryProvider, ParseError, RawReading};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use thiserror::Error;

/// Dataset error types.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    Record(#[from] ParseError),
}

/// Records produced by the generator, in generation order.
#[derive(Debug, Clone, PartialEq)]
pub struct StationDataset {
    records: Vec<RawReading>,
    /// Seed used to generate, if any.
    pub seed: Option<u64>,
}

impl StationDataset {
    pub fn new(records: Vec<RawReading>, seed: Option<u64>) -> Self {
        Self { records, seed }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RawReading] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RawReading> {
        self.records
    }

    /// Same records in a shuffled order, as a feed without ordering
    /// guarantees would deliver them.
    pub fn shuffled(&self, seed: u64) -> Vec<RawReading> {
        let mut records = self.records.clone();
        records.shuffle(&mut StdRng::seed_from_u64(seed));
        records
    }

    /// Wrap the records in an in-memory provider.
    pub fn provider(&self) -> MemoryProvider {
        MemoryProvider::new(self.records.clone())
    }

    /// Export as a keyed snapshot: `{ "<id>": { "timestamp": ..., ... } }`.
    pub fn to_snapshot_json(&self) -> Result<String, DatasetError> {
        let mut map = serde_json::Map::with_capacity(self.records.len());
        for record in &self.records {
            let mut value = serde_json::to_value(record)?;
            if let Some(fields) = value.as_object_mut() {
                fields.remove("id");
            }
            map.insert(record.id.clone(), value);
        }
        Ok(serde_json::to_string_pretty(&serde_json::Value::Object(map))?)
    }

    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        std::fs::write(path, self.to_snapshot_json()?)?;
        Ok(())
    }

    /// Load a keyed snapshot written by [`save_snapshot`](Self::save_snapshot).
    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::new(parse_snapshot(&json)?, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{create_station_sensors, generate_station, GeneratorConfig, StationScenario};

    fn small() -> StationDataset {
        let config = GeneratorConfig::new()
            .with_num_samples(5)
            .with_seed(42)
            .with_dropouts(0.3)
            .with_location("Ettimadai");
        generate_station(&config, &create_station_sensors(StationScenario::Normal)).unwrap()
    }

    #[test]
    fn test_snapshot_is_keyed_by_id() {
        let json = small().to_snapshot_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let record = &value["-Nst000003"];
        assert!(record.get("id").is_none());
        assert_eq!(record["location"], "Ettimadai");
        assert!(record["timestamp"].is_string());
    }

    #[test]
    fn test_snapshot_file_roundtrip() {
        let dataset = small();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("station.json");
        dataset.save_snapshot(&path).unwrap();

        let loaded = StationDataset::load_snapshot(&path).unwrap();
        assert_eq!(loaded.records(), dataset.records());
    }

    #[test]
    fn test_shuffled_keeps_records() {
        let dataset = small();
        let mut shuffled = dataset.shuffled(1);
        shuffled.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(shuffled, dataset.records());
    }
}
