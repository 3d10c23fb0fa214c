//! Windowed trend analysis
//!
//! A relative range (last day, week or month) is cut out of the series,
//! then each attribute gets min / max / mean, the net change between the
//! first and last present value, and a stable / increasing / decreasing
//! classification.

use crate::config::{AttributeDefinition, TrendConfig};
use crate::error::{AnalyticsError, ParseError, Result};
use crate::reading::{Reading, ReadingSeries};
use crate::statistics::{extremes, Summary};
use crate::timestamp::Timestamp;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Relative window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// Last 24 hours
    Day,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
}

impl TimeRange {
    pub fn duration(&self) -> Duration {
        match self {
            TimeRange::Day => Duration::hours(24),
            TimeRange::Week => Duration::days(7),
            TimeRange::Month => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, ParseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(TimeRange::Day),
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            _ => Err(ParseError::Range(s.to_string())),
        }
    }
}

/// Where the window ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAnchor {
    /// At the most recent reading.
    #[default]
    LatestReading,
    /// At a caller-supplied instant, typically "now".
    At(Timestamp),
}

/// Trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Stable,
    Increasing,
    Decreasing,
}

impl TrendDirection {
    /// Classify a net change.
    ///
    /// Stable when |% change| is below the threshold. Without a percentage
    /// (zero baseline) only the sign of the change counts.
    pub fn classify(change: f64, pct_change: Option<f64>, stable_threshold_pct: f64) -> Self {
        let stable = match pct_change {
            Some(pct) => pct.abs() < stable_threshold_pct,
            None => change == 0.0,
        };
        if stable {
            TrendDirection::Stable
        } else if change > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Stable => "stable",
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
        }
    }
}

/// `change / baseline × 100`, undefined for a zero baseline.
pub fn percent_change(baseline: f64, change: f64) -> Option<f64> {
    if baseline == 0.0 {
        None
    } else {
        Some(change / baseline * 100.0)
    }
}

/// Trend of one attribute inside the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeTrend {
    pub attribute: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub first: f64,
    pub last: f64,
    /// last - first
    pub trend: f64,
    /// trend / first × 100
    pub pct_change: Option<f64>,
    pub direction: TrendDirection,
    pub min_reading_id: String,
    pub max_reading_id: String,
}

impl AttributeTrend {
    /// One-line summary, e.g. "The temperature has been increasing by 2.3°C".
    pub fn describe(&self, definition: Option<&AttributeDefinition>) -> String {
        let (name, unit) = match definition {
            Some(d) => (d.display_name.to_lowercase(), d.unit.as_str()),
            None => (self.attribute.replace('_', " "), ""),
        };
        let change = self.trend.abs();
        match self.direction {
            TrendDirection::Stable => {
                format!("The {} remained relatively stable (±{:.1}{})", name, change, unit)
            }
            TrendDirection::Increasing => {
                format!("The {} has been increasing by {:.1}{}", name, change, unit)
            }
            TrendDirection::Decreasing => {
                format!("The {} has been decreasing by {:.1}{}", name, change, unit)
            }
        }
    }
}

/// Per-attribute trends over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub range: TimeRange,
    pub window_start: Timestamp,
    pub window_end: Timestamp,
    pub reading_count: usize,
    pub attributes: BTreeMap<String, AttributeTrend>,
}

impl TrendReport {
    pub fn attribute(&self, id: &str) -> Option<&AttributeTrend> {
        self.attributes.get(id)
    }
}

/// Analyze `attributes` over the `range` window ending at `anchor`.
///
/// Fails with `NoDataForPeriod` when the window holds no readings.
pub fn analyze<'a, I>(
    series: &ReadingSeries,
    range: TimeRange,
    anchor: WindowAnchor,
    attributes: I,
    config: &TrendConfig,
) -> Result<TrendReport>
where
    I: IntoIterator<Item = &'a str>,
{
    let window_end = match anchor {
        WindowAnchor::LatestReading => match series.latest() {
            Some(r) => r.instant,
            None => return Err(AnalyticsError::no_data(format!("last {}", range))),
        },
        WindowAnchor::At(t) => t,
    };
    let window_start = window_end.saturating_sub(range.duration());

    let window = series.between(window_start, window_end);
    if window.is_empty() {
        return Err(AnalyticsError::no_data(format!(
            "last {} ending {}",
            range, window_end
        )));
    }
    log_debug!(
        "trend window {}..{} holds {} of {} readings",
        window_start,
        window_end,
        window.len(),
        series.len()
    );

    let attributes = attributes
        .into_iter()
        .filter_map(|id| {
            attribute_trend(window, id, config.stable_threshold_pct).map(|t| (id.to_string(), t))
        })
        .collect();

    Ok(TrendReport {
        range,
        window_start,
        window_end,
        reading_count: window.len(),
        attributes,
    })
}

fn attribute_trend(window: &[Reading], attribute: &str, threshold: f64) -> Option<AttributeTrend> {
    let values: Vec<f64> = window.iter().filter_map(|r| r.value(attribute)).collect();
    let summary = Summary::from_values(&values)?;
    let ext = extremes(window, attribute)?;

    let first = values[0];
    let last = values[values.len() - 1];
    let trend = last - first;
    let pct_change = percent_change(first, trend);

    Some(AttributeTrend {
        attribute: attribute.to_string(),
        count: summary.count,
        min: summary.min,
        max: summary.max,
        avg: summary.avg,
        first,
        last,
        trend,
        pct_change,
        direction: TrendDirection::classify(trend, pct_change, threshold),
        min_reading_id: ext.min_reading_id,
        max_reading_id: ext.max_reading_id,
    })
}
