//! AnalyticsEngine - configured entry point for all analytics.
//!
//! The engine holds the configuration and the timestamp parser built from
//! it. It keeps no state between calls: every method is a function of the
//! series handed in.

use crate::alert::{self, Alert};
use crate::comparison::{self, ComparisonResult};
use crate::config::AnalyticsConfig;
use crate::daily::{self, DailyBucket};
use crate::error::Result;
use crate::provider::ReadingProvider;
use crate::reading::{RawReading, ReadingSeries};
use crate::regression::{self, RegressionFamily, RegressionResult};
use crate::statistics::{self, Extremes, Summary};
use crate::timestamp::{parse_date, TimestampParser};
use crate::trend::{self, TimeRange, TrendReport, WindowAnchor};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Analytics over reading series, driven by an [`AnalyticsConfig`].
///
/// The default engine uses the station attribute table, UTC and millisecond
/// epochs.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
    parser: TimestampParser,
}

impl AnalyticsEngine {
    /// Create an engine. The configuration is validated first.
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        let parser = TimestampParser::new(&config.timestamps)?;
        Ok(Self { config, parser })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn parser(&self) -> &TimestampParser {
        &self.parser
    }

    /// Normalize raw records into a sorted series.
    pub fn series(&self, raw: Vec<RawReading>) -> Result<ReadingSeries> {
        Ok(ReadingSeries::parse(&raw, &self.parser, self.config.values)?)
    }

    /// Fetch from a provider and normalize.
    pub fn snapshot<P: ReadingProvider + ?Sized>(&self, provider: &P) -> Result<ReadingSeries> {
        let raw = provider.fetch()?;
        self.series(raw)
    }

    /// Summary of one attribute. `None` when it has no present values.
    pub fn statistics(&self, series: &ReadingSeries, attribute: &str) -> Option<Summary> {
        statistics::summarize(series.as_slice(), attribute)
    }

    /// Summaries of every configured attribute with present values.
    pub fn statistics_all(&self, series: &ReadingSeries) -> BTreeMap<String, Summary> {
        statistics::summarize_all(series.as_slice(), self.config.attribute_ids())
    }

    /// Min and max of one attribute with the readings holding them.
    pub fn extremes(&self, series: &ReadingSeries, attribute: &str) -> Option<Extremes> {
        statistics::extremes(series.as_slice(), attribute)
    }

    pub fn regression(
        &self,
        series: &ReadingSeries,
        attribute: &str,
        family: RegressionFamily,
    ) -> Result<RegressionResult> {
        regression::fit(series, attribute, family, &self.config.regression)
    }

    /// Best fitting family by R².
    pub fn best_regression(&self, series: &ReadingSeries, attribute: &str) -> Result<RegressionResult> {
        regression::fit_best(series, attribute, &self.config.regression)
    }

    /// Trend over the window ending at the latest reading.
    pub fn trend(&self, series: &ReadingSeries, range: TimeRange) -> Result<TrendReport> {
        self.trend_at(series, range, WindowAnchor::LatestReading)
    }

    pub fn trend_at(
        &self,
        series: &ReadingSeries,
        range: TimeRange,
        anchor: WindowAnchor,
    ) -> Result<TrendReport> {
        trend::analyze(
            series,
            range,
            anchor,
            self.config.attribute_ids(),
            &self.config.trend,
        )
    }

    /// Narrative line per attribute of a trend report, in table order.
    pub fn describe_trend(&self, report: &TrendReport) -> Vec<String> {
        self.config
            .attributes
            .iter()
            .filter_map(|def| report.attribute(&def.id).map(|t| t.describe(Some(def))))
            .collect()
    }

    /// Threshold alerts for the latest reading.
    pub fn alerts(&self, series: &ReadingSeries) -> Vec<Alert> {
        alert::evaluate_latest(series, &self.config.attributes)
    }

    pub fn compare(
        &self,
        series: &ReadingSeries,
        date_a: NaiveDate,
        date_b: NaiveDate,
    ) -> Result<ComparisonResult> {
        comparison::compare(
            series,
            date_a,
            date_b,
            self.config.attribute_ids(),
            &self.config.trend,
        )
    }

    /// Compare two `YYYY-MM-DD` dates.
    pub fn compare_dates(
        &self,
        series: &ReadingSeries,
        date_a: &str,
        date_b: &str,
    ) -> Result<ComparisonResult> {
        self.compare(series, parse_date(date_a)?, parse_date(date_b)?)
    }

    /// Per-day figures of every configured attribute.
    pub fn daily(&self, series: &ReadingSeries) -> Vec<DailyBucket> {
        daily::aggregate(series, self.config.attribute_ids())
    }
}
