//! Per-day aggregation for charting.

use crate::reading::ReadingSeries;
use crate::statistics::summarize;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Daily figures of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// All readings of one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub reading_count: usize,
    pub attributes: BTreeMap<String, DailyStats>,
}

impl DailyBucket {
    pub fn attribute(&self, id: &str) -> Option<&DailyStats> {
        self.attributes.get(id)
    }
}

/// Group the series by local calendar date, oldest date first.
///
/// Every date with at least one reading gets a bucket, even when none of the
/// listed attributes has a present value that day.
pub fn aggregate<'a, I>(series: &ReadingSeries, attributes: I) -> Vec<DailyBucket>
where
    I: IntoIterator<Item = &'a str>,
{
    let attributes: Vec<&str> = attributes.into_iter().collect();

    series
        .dates()
        .into_iter()
        .map(|date| {
            let day = series.on_date(date);
            let stats = attributes
                .iter()
                .filter_map(|&id| {
                    summarize(day, id).map(|s| {
                        (
                            id.to_string(),
                            DailyStats {
                                avg: s.avg,
                                min: s.min,
                                max: s.max,
                            },
                        )
                    })
                })
                .collect();
            DailyBucket {
                date,
                reading_count: day.len(),
                attributes: stats,
            }
        })
        .collect()
}
