//! Error types for envtrend
//!
//! Every analytics operation returns either a result value or one of the
//! error kinds defined here. Nothing in the crate substitutes a default value
//! for a missing input.

use thiserror::Error;

/// Result type alias for envtrend operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Main error type for analytics operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Malformed input (timestamp, value, range token, date)
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Fewer points than the computation requires
    #[error("Insufficient data: need at least {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    /// Regression family invoked outside its valid input domain
    #[error("Domain error for {family} fit: {reason}")]
    Domain { family: String, reason: String },

    /// A comparison side or trend window matched zero readings
    #[error("No data for period {period}")]
    NoDataForPeriod { period: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The injected reading provider failed
    #[error("Provider error: {0}")]
    Provider(String),
}

impl AnalyticsError {
    /// Shorthand for a domain error.
    pub(crate) fn domain(family: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        AnalyticsError::Domain {
            family: family.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an empty period.
    pub(crate) fn no_data(period: impl std::fmt::Display) -> Self {
        AnalyticsError::NoDataForPeriod {
            period: period.to_string(),
        }
    }
}

/// Errors raised while normalizing raw input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Timestamp string does not match `YYYY-MM-DD_HH-mm-ss`
    #[error("Malformed timestamp '{input}': {reason}")]
    Timestamp { input: String, reason: String },

    /// Numeric epoch cannot be represented as an instant
    #[error("Invalid epoch value {value}: {reason}")]
    Epoch { value: f64, reason: String },

    /// Attribute value is neither a number nor a numeric string
    #[error("Unparseable value for '{attribute}' in reading '{reading}': {raw}")]
    Value {
        reading: String,
        attribute: String,
        raw: String,
    },

    /// Unknown relative range token
    #[error("Unknown time range '{0}' (expected day, week or month)")]
    Range(String),

    /// Calendar date not in `YYYY-MM-DD` form
    #[error("Malformed date '{0}' (expected YYYY-MM-DD)")]
    Date(String),

    /// Snapshot is not a keyed object of records
    #[error("Malformed snapshot: {0}")]
    Snapshot(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalyticsError::InsufficientData {
            required: 2,
            available: 1,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("at least 2"));
        assert!(msg.contains("have 1"));
    }

    #[test]
    fn test_error_conversion() {
        let parse_err = ParseError::Range("fortnight".to_string());
        let err: AnalyticsError = parse_err.into();
        assert!(matches!(err, AnalyticsError::Parse(ParseError::Range(_))));
        assert!(format!("{}", err).contains("fortnight"));
    }

    #[test]
    fn test_no_data_names_period() {
        let err = AnalyticsError::no_data("2025-03-02");
        assert_eq!(
            err,
            AnalyticsError::NoDataForPeriod {
                period: "2025-03-02".to_string()
            }
        );
    }
}
