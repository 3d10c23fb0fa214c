//! # envtrend - Environmental sensor analytics
//!
//! A pure analytics engine for weather-station style readings (temperature,
//! humidity, gas level, pressure, altitude, UV index).
//!
//! ## Key Features
//!
//! - **Normalization**: Epoch or `YYYY-MM-DD_HH-mm-ss` timestamps into one instant type
//! - **Statistics**: min / max / mean / median over present values only
//! - **Regression**: linear, exponential, quadratic, logarithmic and power fits with R²
//! - **Trends**: day / week / month windows classified as stable, increasing or decreasing
//! - **Alerts**: threshold checks against the latest reading
//! - **Comparison**: per-attribute averages of two calendar dates
//! - **Daily buckets**: per-day avg / min / max
//!
//! Every operation is a deterministic function of an immutable
//! [`ReadingSeries`]; nothing is cached between calls.
//!
//! ## Quick Start
//!
//! ```rust
//! use envtrend::{AnalyticsEngine, RawReading, RegressionFamily, TimeRange};
//!
//! let engine = AnalyticsEngine::default();
//!
//! let raw = vec![
//!     RawReading::new("a", "2025-03-01_10-00-00").with_value("gas_level", 420.0),
//!     RawReading::new("b", "2025-03-01_11-00-00").with_value("gas_level", 480.0),
//!     RawReading::new("c", "2025-03-01_12-00-00").with_value("gas_level", 610.0),
//! ];
//! let series = engine.series(raw).unwrap();
//!
//! let stats = engine.statistics(&series, "gas_level").unwrap();
//! assert_eq!(stats.median, 480.0);
//!
//! let fit = engine.regression(&series, "gas_level", RegressionFamily::Linear).unwrap();
//! assert!(fit.r_squared > 0.9);
//!
//! let trend = engine.trend(&series, TimeRange::Day).unwrap();
//! assert!(trend.attribute("gas_level").is_some());
//!
//! // gas_level has a default high threshold of 500
//! let alerts = engine.alerts(&series);
//! assert_eq!(alerts.len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`timestamp`]: Timestamp normalization
//! - [`reading`]: Raw records, parsed readings and sorted series
//! - [`provider`]: Reading provider abstraction
//! - [`config`]: Attribute table and analytics settings
//! - [`statistics`]: Descriptive statistics
//! - [`regression`]: Curve fitting
//! - [`trend`]: Windowed trend analysis
//! - [`alert`]: Threshold alerts
//! - [`comparison`]: Two-date comparison
//! - [`daily`]: Calendar-day aggregation
//! - [`engine`]: Configured facade over all of the above

// Optional logging, compiled away without the `logging` feature
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

// Modules
pub mod alert;
pub mod comparison;
pub mod config;
pub mod daily;
pub mod engine;
pub mod error;
pub mod provider;
pub mod reading;
pub mod regression;
pub mod statistics;
pub mod timestamp;
pub mod trend;

// Re-exports for convenient access
pub use alert::{Alert, AlertBound};
pub use comparison::{AttributeComparison, ComparisonResult};
pub use config::{AnalyticsConfig, AttributeDefinition, RegressionConfig, Severity, TrendConfig};
pub use daily::{DailyBucket, DailyStats};
pub use engine::AnalyticsEngine;
pub use error::{AnalyticsError, ParseError, Result};
pub use provider::{JsonSnapshotProvider, MemoryProvider, ReadingProvider};
pub use reading::{RawReading, RawValue, Reading, ReadingSeries, ValuePolicy};
pub use regression::{FitStrength, RegressionFamily, RegressionResult};
pub use statistics::{Extremes, Summary};
pub use timestamp::{EpochUnit, RawTimestamp, Timestamp, TimestampConfig, TimestampParser};
pub use trend::{AttributeTrend, TimeRange, TrendDirection, TrendReport, WindowAnchor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_basic_workflow() {
        let engine = AnalyticsEngine::default();
        let raw = vec![
            RawReading::new("r1", "2025-03-01_08-00-00").with_value("temperature", 21.0),
            RawReading::new("r2", "2025-03-01_09-00-00").with_value("temperature", 22.0),
            RawReading::new("r3", "2025-03-02_09-00-00").with_value("temperature", 26.0),
        ];
        let series = engine.series(raw).unwrap();

        let daily = engine.daily(&series);
        assert_eq!(daily.len(), 2);

        let cmp = engine.compare_dates(&series, "2025-03-01", "2025-03-02").unwrap();
        let t = cmp.attribute("temperature").unwrap();
        assert_eq!(t.direction, TrendDirection::Increasing);
    }
}
