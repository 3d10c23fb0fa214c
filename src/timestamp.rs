//! Timestamp normalization
//!
//! Station records carry either a numeric epoch or a string in the fixed
//! pattern `YYYY-MM-DD_HH-mm-ss` (local wall-clock time). Both are normalized
//! to [`Timestamp`], a local date-time that orders and compares directly.

use crate::error::ParseError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// chrono format of the fixed station pattern
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// chrono format of a calendar date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Shape of the fixed pattern; `#` is a digit, anything else is literal.
const TIMESTAMP_SHAPE: &[u8] = b"####-##-##_##-##-##";
const DATE_SHAPE: &[u8] = b"####-##-##";

/// A normalized instant in the station's local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Wrap a local date-time.
    pub fn new(local: NaiveDateTime) -> Self {
        Self(local)
    }

    /// Build from calendar fields. Returns `None` for impossible dates.
    pub fn from_ymd_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, min, sec))
            .map(Self)
    }

    /// Local calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// Underlying local date-time.
    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Instant `duration` earlier, saturating at the calendar minimum.
    pub fn saturating_sub(&self, duration: Duration) -> Self {
        Self(self.0.checked_sub_signed(duration).unwrap_or(NaiveDateTime::MIN))
    }

    /// Render in the fixed station pattern.
    pub fn to_pattern(&self) -> String {
        self.0.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

/// Timestamp as it arrives from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Numeric epoch, unit given by [`EpochUnit`].
    Epoch(f64),
    /// Fixed-pattern string.
    Text(String),
}

impl From<&str> for RawTimestamp {
    fn from(s: &str) -> Self {
        RawTimestamp::Text(s.to_string())
    }
}

impl From<i64> for RawTimestamp {
    fn from(v: i64) -> Self {
        RawTimestamp::Epoch(v as f64)
    }
}

/// Unit of numeric epoch values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpochUnit {
    Seconds,
    #[default]
    Millis,
}

impl EpochUnit {
    fn per_second(&self) -> f64 {
        match self {
            EpochUnit::Seconds => 1.0,
            EpochUnit::Millis => 1000.0,
        }
    }
}

/// Timestamp normalization settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampConfig {
    /// Offset of station local time from UTC, in seconds (applies to epochs).
    pub utc_offset_secs: i32,
    /// Unit of numeric epochs.
    pub epoch_unit: EpochUnit,
}

/// Normalizes raw timestamps into [`Timestamp`].
#[derive(Debug, Clone)]
pub struct TimestampParser {
    offset: FixedOffset,
    unit: EpochUnit,
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            unit: EpochUnit::Millis,
        }
    }
}

impl TimestampParser {
    /// Create a parser from configuration.
    pub fn new(config: &TimestampConfig) -> crate::Result<Self> {
        let offset = FixedOffset::east_opt(config.utc_offset_secs).ok_or_else(|| {
            crate::AnalyticsError::Config(format!(
                "utc_offset_secs {} is outside +/-24h",
                config.utc_offset_secs
            ))
        })?;
        Ok(Self {
            offset,
            unit: config.epoch_unit,
        })
    }

    /// Normalize any raw timestamp.
    pub fn parse(&self, raw: &RawTimestamp) -> Result<Timestamp, ParseError> {
        match raw {
            RawTimestamp::Epoch(v) => self.parse_epoch(*v),
            RawTimestamp::Text(s) => self.parse_str(s),
        }
    }

    /// Parse a fixed-pattern string. Numeric strings are treated as epochs.
    /// Surrounding whitespace is rejected.
    pub fn parse_str(&self, input: &str) -> Result<Timestamp, ParseError> {
        if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(v) = input.parse::<f64>() {
                return self.parse_epoch(v);
            }
        }

        if !matches_shape(input, TIMESTAMP_SHAPE) {
            return Err(ParseError::Timestamp {
                input: input.to_string(),
                reason: "expected YYYY-MM-DD_HH-mm-ss".to_string(),
            });
        }

        NaiveDateTime::parse_from_str(input, TIMESTAMP_FORMAT)
            .map(Timestamp)
            .map_err(|e| ParseError::Timestamp {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }

    /// Convert a numeric epoch to local time.
    ///
    /// Only whole, non-negative counts of the configured unit are accepted.
    pub fn parse_epoch(&self, value: f64) -> Result<Timestamp, ParseError> {
        if !value.is_finite() {
            return Err(ParseError::Epoch {
                value,
                reason: "not a finite number".to_string(),
            });
        }
        if value < 0.0 {
            return Err(ParseError::Epoch {
                value,
                reason: "before the Unix epoch".to_string(),
            });
        }
        if value.fract() != 0.0 {
            return Err(ParseError::Epoch {
                value,
                reason: "fraction of the epoch unit".to_string(),
            });
        }

        let secs_f = value / self.unit.per_second();
        let secs = secs_f.floor();
        if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
            return Err(ParseError::Epoch {
                value,
                reason: "out of range".to_string(),
            });
        }
        let nanos = (((secs_f - secs) * 1e9).round() as u32).min(999_999_999);

        let utc = DateTime::from_timestamp(secs as i64, nanos).ok_or_else(|| ParseError::Epoch {
            value,
            reason: "out of calendar range".to_string(),
        })?;

        Ok(Timestamp(utc.with_timezone(&self.offset).naive_local()))
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate, ParseError> {
    if !matches_shape(input, DATE_SHAPE) {
        return Err(ParseError::Date(input.to_string()));
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| ParseError::Date(input.to_string()))
}

fn matches_shape(input: &str, shape: &[u8]) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == shape.len()
        && bytes.iter().zip(shape).all(|(&b, &s)| match s {
            b'#' => b.is_ascii_digit(),
            lit => b == lit,
        })
}
