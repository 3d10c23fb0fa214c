//! Descriptive statistics over present attribute values.
//!
//! Absent values are skipped, never treated as zero. When an attribute has no
//! present values at all the result is `None`.

use crate::reading::Reading;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// min / max / mean / median of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub median: f64,
}

impl Summary {
    /// Summarize the finite values of a set. `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        // Rounding can push the mean a ulp outside the range.
        let avg = (sorted.iter().sum::<f64>() / sorted.len() as f64).clamp(min, max);

        Some(Self {
            count: sorted.len(),
            min,
            max,
            avg,
            median: median_of_sorted(&sorted),
        })
    }

    /// max - min
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Smallest and largest value of an attribute with the readings holding them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub min: f64,
    pub min_reading_id: String,
    pub max: f64,
    pub max_reading_id: String,
}

/// Median of a set of values. `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(median_of_sorted(&sorted))
}

/// Arithmetic mean. `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Present values of `attribute`, in reading order.
pub fn present_values(readings: &[Reading], attribute: &str) -> Vec<f64> {
    readings.iter().filter_map(|r| r.value(attribute)).collect()
}

/// Summary of one attribute over a set of readings.
pub fn summarize(readings: &[Reading], attribute: &str) -> Option<Summary> {
    Summary::from_values(&present_values(readings, attribute))
}

/// Summaries for each listed attribute that has at least one present value.
pub fn summarize_all<'a, I>(readings: &[Reading], attributes: I) -> BTreeMap<String, Summary>
where
    I: IntoIterator<Item = &'a str>,
{
    attributes
        .into_iter()
        .filter_map(|id| summarize(readings, id).map(|s| (id.to_string(), s)))
        .collect()
}

/// Locate min and max of an attribute. Ties resolve to the earliest reading.
pub fn extremes(readings: &[Reading], attribute: &str) -> Option<Extremes> {
    let mut present = readings
        .iter()
        .filter_map(|r| r.value(attribute).map(|v| (v, r.id.as_str())));

    let (first_value, first_id) = present.next()?;
    let mut lo = (first_value, first_id);
    let mut hi = (first_value, first_id);
    for (v, id) in present {
        if v < lo.0 {
            lo = (v, id);
        }
        if v > hi.0 {
            hi = (v, id);
        }
    }

    Some(Extremes {
        min: lo.0,
        min_reading_id: lo.1.to_string(),
        max: hi.0,
        max_reading_id: hi.1.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn reading(id: &str, hour: u32, value: Option<f64>) -> Reading {
        let r = Reading::new(id, Timestamp::from_ymd_hms(2025, 3, 1, hour, 0, 0).unwrap());
        match value {
            Some(v) => r.with_value("humidity", v),
            None => r.with_absent("humidity"),
        }
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median(&[1.0, 3.0, 5.0]), Some(3.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_summary_values() {
        let s = Summary::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_relative_eq!(s.avg, 2.5);
        assert_relative_eq!(s.median, 2.5);
        assert_relative_eq!(s.range(), 3.0);
    }

    #[test]
    fn test_absent_values_are_skipped() {
        let readings = vec![
            reading("a", 1, Some(60.0)),
            reading("b", 2, None),
            reading("c", 3, Some(70.0)),
        ];
        let s = summarize(&readings, "humidity").unwrap();
        assert_eq!(s.count, 2);
        assert_relative_eq!(s.avg, 65.0);
        assert_eq!(s.min, 60.0);
    }

    #[test]
    fn test_no_present_values_is_none() {
        let readings = vec![reading("a", 1, None), reading("b", 2, None)];
        assert!(summarize(&readings, "humidity").is_none());
        assert!(summarize(&readings, "temperature").is_none());
        assert!(extremes(&readings, "humidity").is_none());
    }

    #[test]
    fn test_extremes_first_occurrence() {
        let readings = vec![
            reading("a", 1, Some(55.0)),
            reading("b", 2, Some(70.0)),
            reading("c", 3, Some(55.0)),
            reading("d", 4, Some(70.0)),
        ];
        let e = extremes(&readings, "humidity").unwrap();
        assert_eq!(e.min_reading_id, "a");
        assert_eq!(e.max_reading_id, "b");
    }

    #[test]
    fn test_summarize_all_skips_missing_attributes() {
        let readings = vec![reading("a", 1, Some(55.0))];
        let all = summarize_all(&readings, ["humidity", "pressure"]);
        assert_eq!(all.len(), 1);
        assert!(all.contains_key("humidity"));
    }

    #[test]
    fn test_nan_is_treated_as_absent() {
        let readings = vec![reading("a", 1, Some(20.0)), reading("b", 2, Some(f64::NAN))];
        let s = summarize(&readings, "humidity").unwrap();
        assert_eq!(s.count, 1);
        assert_eq!(s.avg, 20.0);

        let s = Summary::from_values(&[f64::NAN, 3.0, f64::NEG_INFINITY, 1.0]).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!((s.min, s.max), (1.0, 3.0));
        assert!(Summary::from_values(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }

    proptest! {
        #[test]
        fn prop_summary_is_ordered(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..200)) {
            let s = Summary::from_values(&values).unwrap();
            prop_assert!(s.min <= s.median && s.median <= s.max);
            prop_assert!(s.min <= s.avg && s.avg <= s.max);
            prop_assert_eq!(s.count, values.len());
        }
    }
}
