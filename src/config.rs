//! Analytics configuration.
//!
//! The attribute table (ids, display metadata, thresholds, severities) and
//! the tunable constants of the trend and regression engines. Configuration
//! is supplied by the hosting application; [`AnalyticsConfig::default`]
//! describes the six attributes of a typical weather station.

use crate::error::{AnalyticsError, Result};
use crate::reading::ValuePolicy;
use crate::timestamp::TimestampConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Master configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Attribute table, in display order.
    pub attributes: Vec<AttributeDefinition>,

    /// Timestamp normalization.
    pub timestamps: TimestampConfig,

    /// Handling of unparseable attribute values.
    pub values: ValuePolicy,

    /// Trend classification.
    pub trend: TrendConfig,

    /// Regression interpretation bands.
    pub regression: RegressionConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            attributes: AttributeDefinition::station_defaults(),
            timestamps: TimestampConfig::default(),
            values: ValuePolicy::default(),
            trend: TrendConfig::default(),
            regression: RegressionConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Look up an attribute definition by id.
    pub fn attribute(&self, id: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.id == id)
    }

    /// Attribute ids in table order.
    pub fn attribute_ids(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.id.as_str())
    }

    /// Check structural consistency.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for attr in &self.attributes {
            if attr.id.trim().is_empty() {
                return Err(AnalyticsError::Config("attribute id is empty".to_string()));
            }
            if !seen.insert(attr.id.as_str()) {
                return Err(AnalyticsError::Config(format!(
                    "duplicate attribute id: {}",
                    attr.id
                )));
            }
            for bound in [attr.high_threshold, attr.low_threshold].into_iter().flatten() {
                if !bound.is_finite() {
                    return Err(AnalyticsError::Config(format!(
                        "non-finite threshold for {}",
                        attr.id
                    )));
                }
            }
            if let (Some(low), Some(high)) = (attr.low_threshold, attr.high_threshold) {
                if low >= high {
                    return Err(AnalyticsError::Config(format!(
                        "low threshold {} must be below high threshold {} for {}",
                        low, high, attr.id
                    )));
                }
            }
        }

        if self.timestamps.utc_offset_secs.abs() >= 86_400 {
            return Err(AnalyticsError::Config(format!(
                "utc_offset_secs {} is outside +/-24h",
                self.timestamps.utc_offset_secs
            )));
        }

        let t = self.trend.stable_threshold_pct;
        if !t.is_finite() || t < 0.0 {
            return Err(AnalyticsError::Config(format!(
                "stable_threshold_pct must be a non-negative number, got {}",
                t
            )));
        }

        let r = &self.regression;
        if !(0.0..=1.0).contains(&r.strong_threshold)
            || !(0.0..=1.0).contains(&r.moderate_threshold)
            || r.moderate_threshold >= r.strong_threshold
        {
            return Err(AnalyticsError::Config(format!(
                "regression bands must satisfy 0 <= moderate < strong <= 1, got {} / {}",
                r.moderate_threshold, r.strong_threshold
            )));
        }

        Ok(())
    }

    /// Parse from JSON. Missing sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AnalyticsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AnalyticsError::Config(e.to_string()))
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| AnalyticsError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Save to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_pretty()?)
            .map_err(|e| AnalyticsError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Severity attached to threshold alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One measured quantity and its alerting rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Key of the attribute in raw records (e.g. `gas_level`).
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Unit suffix (may be empty).
    #[serde(default)]
    pub unit: String,
    /// Alert when the latest value is above this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_threshold: Option<f64>,
    /// Alert when the latest value is below this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_threshold: Option<f64>,
    /// Severity of alerts raised for this attribute.
    #[serde(default)]
    pub severity: Severity,
}

impl AttributeDefinition {
    /// Create a definition without thresholds.
    pub fn new(id: &str, display_name: &str, unit: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            unit: unit.to_string(),
            high_threshold: None,
            low_threshold: None,
            severity: Severity::Warning,
        }
    }

    /// Set the upper bound.
    pub fn with_high(mut self, threshold: f64) -> Self {
        self.high_threshold = Some(threshold);
        self
    }

    /// Set the lower bound.
    pub fn with_low(mut self, threshold: f64) -> Self {
        self.low_threshold = Some(threshold);
        self
    }

    /// Set the alert severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// True when at least one bound is configured.
    pub fn has_threshold(&self) -> bool {
        self.high_threshold.is_some() || self.low_threshold.is_some()
    }

    /// Format a value with this attribute's unit.
    pub fn format_value(&self, value: f64) -> String {
        format!("{:.1}{}", value, self.unit)
    }

    /// The six attributes reported by the station.
    pub fn station_defaults() -> Vec<Self> {
        vec![
            Self::new("temperature", "Temperature", "°C"),
            Self::new("humidity", "Humidity", "%"),
            Self::new("gas_level", "Gas Level", "ppm")
                .with_high(500.0)
                .with_severity(Severity::Error),
            Self::new("pressure", "Pressure", "hPa"),
            Self::new("altitude", "Altitude", "m"),
            Self::new("uv_index", "UV Index", "")
                .with_high(8.0)
                .with_severity(Severity::Warning),
        ]
    }
}

/// Trend classification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// |% change| below this is classified stable.
    pub stable_threshold_pct: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            stable_threshold_pct: 5.0,
        }
    }
}

/// R² interpretation bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    /// R² above this is a strong fit.
    pub strong_threshold: f64,
    /// R² above this (and not strong) is a moderate fit.
    pub moderate_threshold: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            strong_threshold: 0.7,
            moderate_threshold: 0.3,
        }
    }
}
