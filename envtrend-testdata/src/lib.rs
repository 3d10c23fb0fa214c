// Envtrend Testdata - Synthetic station feeds
// Copyright (c) 2025 Envtrend Contributors
//
// Dual-licensed under MIT or Apache-2.0, at your option.

//! # Envtrend Testdata
//!
//! Seeded synthetic readings from a six-attribute weather station, used to
//! exercise envtrend end to end.
//!
//! - **Signal patterns**: diurnal cycles, random walks, inverse coupling
//! - **Faults**: gas-level spikes, `null` dropouts, garbled values
//! - **Output**: [`envtrend::RawReading`]s or a keyed JSON snapshot
//!
//! ## Quick Start
//!
//! ```rust
//! use envtrend::AnalyticsEngine;
//! use envtrend_testdata::{create_station_sensors, generate_station, GeneratorConfig, StationScenario};
//!
//! let config = GeneratorConfig::new().with_duration_days(2.0).with_seed(42);
//! let sensors = create_station_sensors(StationScenario::Normal);
//! let dataset = generate_station(&config, &sensors).unwrap();
//!
//! let engine = AnalyticsEngine::default();
//! let series = engine.series(dataset.into_records()).unwrap();
//! assert_eq!(engine.daily(&series).len(), 2);
//! ```

pub mod dataset;
pub mod generator;
pub mod patterns;

pub use dataset::{DatasetError, StationDataset};
pub use generator::{
    create_station_sensors, generate_station, GeneratorConfig, SensorConfig, Spike,
    StationScenario, TimestampStyle,
};
pub use patterns::SignalPattern;
