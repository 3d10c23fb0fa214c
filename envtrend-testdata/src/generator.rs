// Envtrend Testdata - Station generator
// Copyright (c) 2025 Envtrend Contributors
//
// Dual-licensed under MIT or Apache-2.0, at your option.

//! Synthetic weather-station feed.
//!
//! Produces [`RawReading`]s the way a station pushes them: fixed-pattern or
//! epoch timestamps, values rounded to two decimals, the occasional dropout
//! (`null`) and the occasional garbled string.

use crate::dataset::{DatasetError, StationDataset};
use crate::patterns::{inverse_map, PatternState, SignalPattern};
use chrono::Timelike;
use envtrend::{RawReading, RawTimestamp, TimestampParser};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How timestamps are written into the generated records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampStyle {
    /// `YYYY-MM-DD_HH-mm-ss`
    #[default]
    Pattern,
    /// Milliseconds since the Unix epoch.
    EpochMillis,
}

/// Generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// First sample, milliseconds since the Unix epoch (UTC).
    pub start_time_ms: i64,
    /// Interval between samples in seconds.
    pub sample_interval_secs: u64,
    /// Number of samples to generate.
    pub num_samples: usize,
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub timestamp_style: TimestampStyle,
    /// Chance that a value is delivered as `null`.
    pub dropout_probability: f64,
    /// Chance that a value is delivered as a non-numeric string.
    pub garble_probability: f64,
    /// Location label attached to every record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_time_ms: 1_740_787_200_000, // 2025-03-01 00:00:00 UTC
            sample_interval_secs: 600,        // 10 minutes
            num_samples: 144,                 // 1 day
            seed: None,
            timestamp_style: TimestampStyle::Pattern,
            dropout_probability: 0.0,
            garble_probability: 0.0,
            location: None,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_time(mut self, timestamp_ms: i64) -> Self {
        self.start_time_ms = timestamp_ms;
        self
    }

    pub fn with_sample_interval_secs(mut self, secs: u64) -> Self {
        self.sample_interval_secs = secs;
        self
    }

    pub fn with_num_samples(mut self, n: usize) -> Self {
        self.num_samples = n;
        self
    }

    /// Set duration in hours (calculates num_samples from interval).
    pub fn with_duration_hours(mut self, hours: f64) -> Self {
        let total_secs = hours * 3600.0;
        self.num_samples = (total_secs / self.sample_interval_secs.max(1) as f64).ceil() as usize;
        self
    }

    pub fn with_duration_days(self, days: f64) -> Self {
        self.with_duration_hours(days * 24.0)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_timestamp_style(mut self, style: TimestampStyle) -> Self {
        self.timestamp_style = style;
        self
    }

    pub fn with_dropouts(mut self, probability: f64) -> Self {
        self.dropout_probability = probability;
        self
    }

    pub fn with_garbled_values(mut self, probability: f64) -> Self {
        self.garble_probability = probability;
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    /// Timestamp of sample `i` in milliseconds.
    pub fn sample_time_ms(&self, i: usize) -> i64 {
        self.start_time_ms + (i as u64 * self.sample_interval_secs * 1000) as i64
    }
}

/// Additive spike on one attribute, active for a run of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub start_sample: usize,
    pub duration_samples: usize,
    pub magnitude: f64,
}

impl Spike {
    pub fn is_active(&self, sample: usize) -> bool {
        sample >= self.start_sample && sample < self.start_sample + self.duration_samples
    }
}

/// One station attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Attribute id as it appears in records.
    pub id: String,
    /// Minimum physical value; output is clamped to it.
    pub min: f64,
    /// Maximum physical value.
    pub max: f64,
    pub pattern: SignalPattern,
    /// Standard deviation of added noise.
    pub noise_std: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spikes: Vec<Spike>,
}

impl SensorConfig {
    pub fn new(id: &str, min: f64, max: f64, pattern: SignalPattern) -> Self {
        Self {
            id: id.to_string(),
            min,
            max,
            pattern,
            noise_std: 0.0,
            spikes: Vec::new(),
        }
    }

    pub fn with_noise(mut self, std: f64) -> Self {
        self.noise_std = std;
        self
    }

    pub fn with_spike(mut self, start_sample: usize, duration_samples: usize, magnitude: f64) -> Self {
        self.spikes.push(Spike {
            start_sample,
            duration_samples,
            magnitude,
        });
        self
    }
}

/// Preset station behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationScenario {
    /// Ordinary weather, gas level well below the alert threshold.
    Normal,
    /// Gas level jumps above the alert threshold from `at_sample` on.
    GasLeak { at_sample: usize },
}

/// The six attributes of the reference station.
pub fn create_station_sensors(scenario: StationScenario) -> Vec<SensorConfig> {
    let mut gas = SensorConfig::new("gas_level", 0.0, 2000.0, SignalPattern::Constant { value: 380.0 })
        .with_noise(12.0);
    if let StationScenario::GasLeak { at_sample } = scenario {
        gas = gas.with_spike(at_sample, usize::MAX - at_sample, 350.0);
    }

    vec![
        SensorConfig::new(
            "temperature",
            -40.0,
            60.0,
            SignalPattern::Diurnal {
                min: 16.0,
                max: 31.0,
                peak_hour: 14.0,
                spread: 4.0,
            },
        )
        .with_noise(0.3),
        SensorConfig::new(
            "humidity",
            0.0,
            100.0,
            SignalPattern::InverseOf {
                source_id: "temperature".to_string(),
                source_range: (16.0, 31.0),
                target_range: (35.0, 85.0),
            },
        )
        .with_noise(1.5),
        gas,
        SensorConfig::new(
            "pressure",
            950.0,
            1060.0,
            SignalPattern::RandomWalk {
                start: 1013.0,
                step_std: 0.15,
            },
        ),
        SensorConfig::new("altitude", 0.0, 9000.0, SignalPattern::Constant { value: 412.0 }),
        SensorConfig::new(
            "uv_index",
            0.0,
            15.0,
            SignalPattern::Diurnal {
                min: -3.0,
                max: 9.0,
                peak_hour: 13.0,
                spread: 2.5,
            },
        )
        .with_noise(0.2),
    ]
}

/// Generate a station feed.
pub fn generate_station(
    config: &GeneratorConfig,
    sensors: &[SensorConfig],
) -> Result<StationDataset, DatasetError> {
    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let parser = TimestampParser::default();

    let mut states: HashMap<&str, PatternState> = sensors
        .iter()
        .map(|s| (s.id.as_str(), PatternState::for_pattern(&s.pattern)))
        .collect();

    let mut records = Vec::with_capacity(config.num_samples);
    for i in 0..config.num_samples {
        let time_ms = config.sample_time_ms(i);
        let instant = parser.parse_epoch(time_ms as f64)?;
        let clock = instant.as_naive().time();
        let hour_of_day = clock.num_seconds_from_midnight() as f64 / 3600.0;
        let hours_elapsed = (i as u64 * config.sample_interval_secs) as f64 / 3600.0;

        // Independent patterns first, derived ones read them.
        let mut base: HashMap<&str, f64> = HashMap::new();
        for sensor in sensors {
            if let Some(state) = states.get_mut(sensor.id.as_str()) {
                if let Some(v) = state.evaluate(&sensor.pattern, hours_elapsed, hour_of_day, &mut rng) {
                    base.insert(sensor.id.as_str(), v);
                }
            }
        }
        for sensor in sensors {
            if let SignalPattern::InverseOf {
                source_id,
                source_range,
                target_range,
            } = &sensor.pattern
            {
                let source = base
                    .get(source_id.as_str())
                    .copied()
                    .unwrap_or((source_range.0 + source_range.1) / 2.0);
                base.insert(sensor.id.as_str(), inverse_map(source, *source_range, *target_range));
            }
        }

        let timestamp = match config.timestamp_style {
            TimestampStyle::Pattern => RawTimestamp::Text(instant.to_pattern()),
            TimestampStyle::EpochMillis => RawTimestamp::from(time_ms),
        };
        let mut record = RawReading::new(&format!("-Nst{:06}", i), timestamp);
        if let Some(location) = &config.location {
            record = record.with_location(location);
        }

        for sensor in sensors {
            let roll = rng.gen::<f64>();
            if roll < config.dropout_probability {
                record = record.with_missing(&sensor.id);
                continue;
            }
            if roll < config.dropout_probability + config.garble_probability {
                record = record.with_value(&sensor.id, "ERR");
                continue;
            }

            let mut value = base.get(sensor.id.as_str()).copied().unwrap_or(sensor.min);
            if sensor.noise_std > 0.0 {
                if let Ok(noise) = Normal::new(0.0, sensor.noise_std) {
                    value += noise.sample(&mut rng);
                }
            }
            value += sensor
                .spikes
                .iter()
                .filter(|s| s.is_active(i))
                .map(|s| s.magnitude)
                .sum::<f64>();

            let value = (value.clamp(sensor.min, sensor.max) * 100.0).round() / 100.0;
            record = record.with_value(&sensor.id, value);
        }

        records.push(record);
    }

    Ok(StationDataset::new(records, config.seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use envtrend::RawValue;

    #[test]
    fn test_sample_count_and_ids() {
        let config = GeneratorConfig::new().with_duration_hours(2.0).with_seed(42);
        let sensors = create_station_sensors(StationScenario::Normal);
        let dataset = generate_station(&config, &sensors).unwrap();

        assert_eq!(dataset.len(), 12);
        assert_eq!(dataset.records()[0].id, "-Nst000000");
        assert_eq!(
            dataset.records()[0].timestamp,
            RawTimestamp::Text("2025-03-01_00-00-00".to_string())
        );
        assert_eq!(
            dataset.records()[1].timestamp,
            RawTimestamp::Text("2025-03-01_00-10-00".to_string())
        );
        assert_eq!(dataset.records()[0].values.len(), 6);
    }

    #[test]
    fn test_uv_is_clipped_at_zero() {
        let config = GeneratorConfig::new().with_seed(7);
        let sensors = create_station_sensors(StationScenario::Normal);
        let dataset = generate_station(&config, &sensors).unwrap();

        for record in dataset.records() {
            let uv = record.values["uv_index"].as_f64().unwrap();
            assert!(uv >= 0.0);
        }
        // midnight is far from the 13:00 peak
        assert_eq!(dataset.records()[0].values["uv_index"].as_f64(), Some(0.0));
    }

    #[test]
    fn test_gas_leak_spike() {
        let config = GeneratorConfig::new().with_num_samples(20).with_seed(3);
        let sensors = create_station_sensors(StationScenario::GasLeak { at_sample: 10 });
        let dataset = generate_station(&config, &sensors).unwrap();

        let gas = |i: usize| dataset.records()[i].values["gas_level"].as_f64().unwrap();
        assert!(gas(5) < 500.0);
        assert!(gas(15) > 500.0);
    }

    #[test]
    fn test_dropouts_and_garbage() {
        let config = GeneratorConfig::new()
            .with_seed(11)
            .with_dropouts(0.2)
            .with_garbled_values(0.1);
        let sensors = create_station_sensors(StationScenario::Normal);
        let dataset = generate_station(&config, &sensors).unwrap();

        let values = dataset.records().iter().flat_map(|r| r.values.values());
        let (mut missing, mut garbled) = (0, 0);
        for v in values {
            match v {
                RawValue::Missing => missing += 1,
                RawValue::Text(_) => garbled += 1,
                _ => {}
            }
        }
        assert!(missing > 0);
        assert!(garbled > 0);
    }

    #[test]
    fn test_epoch_style() {
        let config = GeneratorConfig::new()
            .with_num_samples(2)
            .with_timestamp_style(TimestampStyle::EpochMillis);
        let dataset = generate_station(&config, &create_station_sensors(StationScenario::Normal)).unwrap();
        assert_eq!(
            dataset.records()[1].timestamp,
            RawTimestamp::from(1_740_787_800_000_i64)
        );
    }

    #[test]
    fn test_reproducibility() {
        let config = GeneratorConfig::new().with_num_samples(30).with_seed(12345);
        let sensors = create_station_sensors(StationScenario::Normal);
        let a = generate_station(&config, &sensors).unwrap();
        let b = generate_station(&config, &sensors).unwrap();
        assert_eq!(a.records(), b.records());
    }
}
