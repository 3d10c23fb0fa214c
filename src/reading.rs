//! Readings and reading series
//!
//! A [`RawReading`] is a record as delivered by the feed: a timestamp in one
//! of the accepted shapes and a loose mapping of attribute values. Parsing
//! produces an immutable [`Reading`] whose values are either a finite number
//! or explicitly absent. A [`ReadingSeries`] holds readings sorted ascending
//! by instant; it is the only input the analytics accept.

use crate::error::ParseError;
use crate::timestamp::{RawTimestamp, Timestamp, TimestampParser};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What to do with attribute values that are not numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuePolicy {
    /// Keep the attribute as explicitly absent.
    #[default]
    MarkAbsent,
    /// Fail the whole parse with [`ParseError::Value`].
    Reject,
}

/// Attribute value as delivered by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Missing,
    Other(serde_json::Value),
}

impl RawValue {
    /// Numeric interpretation, if any. Non-finite numbers have none.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            RawValue::Number(v) => *v,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Missing | RawValue::Other(_) => return None,
        };
        v.is_finite().then_some(v)
    }

    fn describe(&self) -> String {
        match self {
            RawValue::Number(v) => v.to_string(),
            RawValue::Text(s) => format!("{:?}", s),
            RawValue::Missing => "null".to_string(),
            RawValue::Other(v) => v.to_string(),
        }
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

/// A record as delivered by the feed.
///
/// Every field other than `id`, `timestamp` and `location` is an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    #[serde(default)]
    pub id: String,
    pub timestamp: RawTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub values: BTreeMap<String, RawValue>,
}

impl RawReading {
    /// Create a record with no attribute values.
    pub fn new(id: &str, timestamp: impl Into<RawTimestamp>) -> Self {
        Self {
            id: id.to_string(),
            timestamp: timestamp.into(),
            location: None,
            values: BTreeMap::new(),
        }
    }

    /// Add an attribute value.
    pub fn with_value(mut self, attribute: &str, value: impl Into<RawValue>) -> Self {
        self.values.insert(attribute.to_string(), value.into());
        self
    }

    /// Add an explicitly missing attribute.
    pub fn with_missing(mut self, attribute: &str) -> Self {
        self.values.insert(attribute.to_string(), RawValue::Missing);
        self
    }

    /// Set the location label.
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }
}

/// Parse a keyed JSON snapshot (`{ "<key>": { record }, ... }`) into records.
///
/// The key becomes the reading id. A JSON array of records is accepted too;
/// records without an id are numbered by position.
pub fn parse_snapshot(json: &str) -> Result<Vec<RawReading>, ParseError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ParseError::Snapshot(e.to_string()))?;

    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(key, v)| record_from_value(key, v, true))
            .collect(),
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| record_from_value(i.to_string(), v, false))
            .collect(),
        serde_json::Value::Null => Ok(Vec::new()),
        other => Err(ParseError::Snapshot(format!(
            "expected an object or array of records, got {}",
            other
        ))),
    }
}

fn record_from_value(
    key: String,
    value: serde_json::Value,
    key_is_id: bool,
) -> Result<RawReading, ParseError> {
    let mut raw: RawReading = serde_json::from_value(value)
        .map_err(|e| ParseError::Snapshot(format!("record '{}': {}", key, e)))?;
    if key_is_id || raw.id.is_empty() {
        raw.id = key;
    }
    Ok(raw)
}

/// One timestamped snapshot of attribute values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: String,
    pub instant: Timestamp,
    /// `None` marks a value that was missing or unparseable.
    pub values: BTreeMap<String, Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Reading {
    /// Create a reading with no values.
    pub fn new(id: &str, instant: Timestamp) -> Self {
        Self {
            id: id.to_string(),
            instant,
            values: BTreeMap::new(),
            location: None,
        }
    }

    /// Add a value. Non-finite values are stored as absent.
    pub fn with_value(mut self, attribute: &str, value: f64) -> Self {
        self.values
            .insert(attribute.to_string(), Some(value).filter(|v| v.is_finite()));
        self
    }

    /// Add an absent value.
    pub fn with_absent(mut self, attribute: &str) -> Self {
        self.values.insert(attribute.to_string(), None);
        self
    }

    /// Present value of an attribute. Non-finite entries count as absent.
    pub fn value(&self, attribute: &str) -> Option<f64> {
        self.values
            .get(attribute)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }

    /// Normalize a raw record.
    pub fn from_raw(
        raw: &RawReading,
        parser: &TimestampParser,
        policy: ValuePolicy,
    ) -> Result<Self, ParseError> {
        let instant = parser.parse(&raw.timestamp)?;

        let mut values = BTreeMap::new();
        for (attribute, raw_value) in &raw.values {
            let value = raw_value.as_f64();
            if value.is_none() && *raw_value != RawValue::Missing {
                match policy {
                    ValuePolicy::Reject => {
                        return Err(ParseError::Value {
                            reading: raw.id.clone(),
                            attribute: attribute.clone(),
                            raw: raw_value.describe(),
                        })
                    }
                    ValuePolicy::MarkAbsent => {
                        log_warn!(
                            "reading {}: {} = {} is not numeric, marked absent",
                            raw.id,
                            attribute,
                            raw_value.describe()
                        );
                    }
                }
            }
            values.insert(attribute.clone(), value);
        }

        Ok(Self {
            id: raw.id.clone(),
            instant,
            values,
            location: raw.location.clone(),
        })
    }
}

/// Readings sorted ascending by instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReadingSeries {
    readings: Vec<Reading>,
}

impl ReadingSeries {
    /// Sort readings into a series. Equal instants keep their input order.
    pub fn new(mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|r| r.instant);
        Self { readings }
    }

    /// Normalize and sort raw records. Fails on the first malformed record.
    pub fn parse(
        raw: &[RawReading],
        parser: &TimestampParser,
        policy: ValuePolicy,
    ) -> Result<Self, ParseError> {
        let readings = raw
            .iter()
            .map(|r| Reading::from_raw(r, parser, policy))
            .collect::<Result<Vec<_>, _>>()?;
        log_debug!("parsed {} readings", readings.len());
        Ok(Self::new(readings))
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reading> {
        self.readings.iter()
    }

    /// All readings, oldest first.
    pub fn as_slice(&self) -> &[Reading] {
        &self.readings
    }

    /// Oldest reading.
    pub fn first(&self) -> Option<&Reading> {
        self.readings.first()
    }

    /// Most recent reading.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// Readings with `start <= instant <= end`.
    pub fn between(&self, start: Timestamp, end: Timestamp) -> &[Reading] {
        let lo = self.readings.partition_point(|r| r.instant < start);
        let hi = self.readings.partition_point(|r| r.instant <= end);
        if lo >= hi {
            &[]
        } else {
            &self.readings[lo..hi]
        }
    }

    /// Readings whose local calendar date is `date`.
    pub fn on_date(&self, date: NaiveDate) -> &[Reading] {
        let lo = self.readings.partition_point(|r| r.instant.date() < date);
        let hi = self.readings.partition_point(|r| r.instant.date() <= date);
        &self.readings[lo..hi]
    }

    /// Distinct calendar dates, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.readings.iter().map(|r| r.instant.date()).collect();
        dates.dedup();
        dates
    }

    /// Every attribute id seen in any reading.
    pub fn attribute_ids(&self) -> BTreeSet<&str> {
        self.readings
            .iter()
            .flat_map(|r| r.values.keys().map(String::as_str))
            .collect()
    }

    /// Present values of an attribute, oldest first.
    pub fn values<'a>(&'a self, attribute: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.readings.iter().filter_map(move |r| r.value(attribute))
    }
}

impl AsRef<[Reading]> for ReadingSeries {
    fn as_ref(&self) -> &[Reading] {
        &self.readings
    }
}

impl<'a> IntoIterator for &'a ReadingSeries {
    type Item = &'a Reading;
    type IntoIter = std::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}
