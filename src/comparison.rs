//! Day-over-day comparison
//!
//! Readings of two calendar dates are summarized separately and the
//! per-attribute means compared. Attributes without a present value on
//! either side are left out of the result.

use crate::config::TrendConfig;
use crate::error::{AnalyticsError, Result};
use crate::reading::ReadingSeries;
use crate::statistics::summarize;
use crate::trend::{percent_change, TrendDirection};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Comparison of one attribute between two dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeComparison {
    pub avg_a: f64,
    pub avg_b: f64,
    pub min_a: f64,
    pub max_a: f64,
    pub min_b: f64,
    pub max_b: f64,
    /// avg_b - avg_a
    pub diff: f64,
    /// diff / avg_a × 100, undefined when avg_a is zero
    pub pct_change: Option<f64>,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub period_a: NaiveDate,
    pub period_b: NaiveDate,
    pub readings_a: usize,
    pub readings_b: usize,
    pub attributes: BTreeMap<String, AttributeComparison>,
}

impl ComparisonResult {
    pub fn attribute(&self, id: &str) -> Option<&AttributeComparison> {
        self.attributes.get(id)
    }
}

/// Compare `date_b` against `date_a`.
///
/// Fails with `NoDataForPeriod` naming the first date that has no readings.
pub fn compare<'a, I>(
    series: &ReadingSeries,
    date_a: NaiveDate,
    date_b: NaiveDate,
    attributes: I,
    config: &TrendConfig,
) -> Result<ComparisonResult>
where
    I: IntoIterator<Item = &'a str>,
{
    let side_a = series.on_date(date_a);
    if side_a.is_empty() {
        return Err(AnalyticsError::no_data(date_a));
    }
    let side_b = series.on_date(date_b);
    if side_b.is_empty() {
        return Err(AnalyticsError::no_data(date_b));
    }
    log_debug!(
        "comparing {} ({} readings) with {} ({} readings)",
        date_a,
        side_a.len(),
        date_b,
        side_b.len()
    );

    let mut compared = BTreeMap::new();
    for id in attributes {
        let (Some(a), Some(b)) = (summarize(side_a, id), summarize(side_b, id)) else {
            continue;
        };
        let diff = b.avg - a.avg;
        let pct_change = percent_change(a.avg, diff);
        compared.insert(
            id.to_string(),
            AttributeComparison {
                avg_a: a.avg,
                avg_b: b.avg,
                min_a: a.min,
                max_a: a.max,
                min_b: b.min,
                max_b: b.max,
                diff,
                pct_change,
                direction: TrendDirection::classify(diff, pct_change, config.stable_threshold_pct),
            },
        );
    }

    Ok(ComparisonResult {
        period_a: date_a,
        period_b: date_b,
        readings_a: side_a.len(),
        readings_b: side_b.len(),
        attributes: compared,
    })
}
