//! Crate-wide error types.

use std::io;

use thiserror::Error;

/// Alias used by every fallible operation in the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that propagate out of query execution, config loading, and export.
///
/// Unusable query results are not represented here: they are logged and
/// replaced by the zero curve instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure talking to the database.
    #[error("influx request failed: {0}")]
    Http(#[from] Box<ureq::Error>),
    /// The response body was not valid InfluxDB JSON.
    #[error("cannot decode influx response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The database rejected the statement.
    #[error("influx returned an error for `{statement}`: {message}")]
    Influx { statement: String, message: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        Self::Http(Box::new(err))
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"window.interval_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Reason a returned series cannot be turned into a profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("series `{0}` has no `time` column")]
    MissingTimeColumn(String),
    #[error("series `{0}` has no value column")]
    MissingValueColumn(String),
    #[error("series `{series}` row {row} has an invalid timestamp")]
    BadTimestamp { series: String, row: usize },
    #[error("series `{series}` row {row} has a non-numeric value")]
    BadValue { series: String, row: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_includes_field() {
        let err = ConfigError::new("window.interval_minutes", "must be > 0");
        assert_eq!(
            err.to_string(),
            "config error: window.interval_minutes: must be > 0"
        );
    }

    #[test]
    fn config_error_converts_into_crate_error() {
        let err: Error = ConfigError::new("query.kind", "unknown").into();
        assert!(matches!(err, Error::Config(_)));
    }
}
