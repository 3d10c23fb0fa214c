//! Threshold alerts on the most recent reading.
//!
//! Each attribute with a configured bound is checked against the latest
//! reading. Bounds are strict: a value equal to the threshold does not alert.
//! An absent value never alerts.

use crate::config::{AttributeDefinition, Severity};
use crate::reading::{Reading, ReadingSeries};
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// Which side of the band was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertBound {
    High,
    Low,
}

/// A threshold crossing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    pub attribute_id: String,
    pub triggering_value: f64,
    pub bound: AlertBound,
    pub threshold: f64,
    /// Reading that produced the value.
    pub reading_id: String,
    pub instant: Timestamp,
    pub message: String,
}

/// Check one reading against the attribute table. Alerts come out in table order.
pub fn evaluate(reading: &Reading, definitions: &[AttributeDefinition]) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for def in definitions.iter().filter(|d| d.has_threshold()) {
        let Some(value) = reading.value(&def.id) else {
            continue;
        };

        let crossed = match (def.high_threshold, def.low_threshold) {
            (Some(high), _) if value > high => Some((AlertBound::High, high)),
            (_, Some(low)) if value < low => Some((AlertBound::Low, low)),
            _ => None,
        };

        if let Some((bound, threshold)) = crossed {
            let message = match bound {
                AlertBound::High => format!(
                    "{} is above {}: {}",
                    def.display_name,
                    def.format_value(threshold),
                    def.format_value(value)
                ),
                AlertBound::Low => format!(
                    "{} is below {}: {}",
                    def.display_name,
                    def.format_value(threshold),
                    def.format_value(value)
                ),
            };
            log_debug!("[{}] {}", def.severity.as_str(), message);

            alerts.push(Alert {
                severity: def.severity,
                attribute_id: def.id.clone(),
                triggering_value: value,
                bound,
                threshold,
                reading_id: reading.id.clone(),
                instant: reading.instant,
                message,
            });
        }
    }

    alerts
}

/// Check the latest reading of a series. Empty series produce no alerts.
pub fn evaluate_latest(series: &ReadingSeries, definitions: &[AttributeDefinition]) -> Vec<Alert> {
    series
        .latest()
        .map(|latest| evaluate(latest, definitions))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;

    fn at(hour: u32) -> Timestamp {
        Timestamp::from_ymd_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_gas_level_above_threshold() {
        let config = AnalyticsConfig::default();
        let reading = Reading::new("r1", at(9))
            .with_value("gas_level", 600.0)
            .with_value("uv_index", 3.0);

        let alerts = evaluate(&reading, &config.attributes);
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.attribute_id, "gas_level");
        assert_eq!(alert.severity, Severity::Error);
        assert_eq!(alert.bound, AlertBound::High);
        assert_eq!(alert.triggering_value, 600.0);
        assert_eq!(alert.threshold, 500.0);
        assert_eq!(alert.message, "Gas Level is above 500.0ppm: 600.0ppm");
    }

    #[test]
    fn test_threshold_is_strict() {
        let config = AnalyticsConfig::default();
        let reading = Reading::new("r1", at(9)).with_value("gas_level", 500.0);
        assert!(evaluate(&reading, &config.attributes).is_empty());
    }

    #[test]
    fn test_low_bound() {
        let defs = vec![AttributeDefinition::new("temperature", "Temperature", "°C")
            .with_low(0.0)
            .with_high(40.0)
            .with_severity(Severity::Info)];
        let reading = Reading::new("r1", at(6)).with_value("temperature", -3.5);
        let alerts = evaluate(&reading, &defs);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].bound, AlertBound::Low);
        assert_eq!(alerts[0].severity, Severity::Info);
    }

    #[test]
    fn test_table_order() {
        let config = AnalyticsConfig::default();
        let reading = Reading::new("r1", at(13))
            .with_value("uv_index", 9.5)
            .with_value("gas_level", 720.0);
        let alerts = evaluate(&reading, &config.attributes);
        let ids: Vec<&str> = alerts.iter().map(|a| a.attribute_id.as_str()).collect();
        assert_eq!(ids, vec!["gas_level", "uv_index"]);
    }

    #[test]
    fn test_absent_value_never_alerts() {
        let config = AnalyticsConfig::default();
        let reading = Reading::new("r1", at(9)).with_absent("gas_level");
        assert!(evaluate(&reading, &config.attributes).is_empty());
    }

    #[test]
    fn test_only_latest_reading_is_checked() {
        let config = AnalyticsConfig::default();
        let series = ReadingSeries::new(vec![
            Reading::new("old", at(8)).with_value("gas_level", 900.0),
            Reading::new("new", at(9)).with_value("gas_level", 420.0),
        ]);
        assert!(evaluate_latest(&series, &config.attributes).is_empty());
        assert!(evaluate_latest(&ReadingSeries::default(), &config.attributes).is_empty());
    }
}
