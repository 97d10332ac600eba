//! TOML-based profile query configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::influx::{Connection, HttpConnection, QueryResult};
use crate::profile::LoadProfile;
use crate::query::window::{DATETIME_FORMAT, DEFAULT_INTERVAL_MINUTES};
use crate::query::{AggregatedQuery, MeterQuery, Query, QueryWindow, TableQuery};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Top-level configuration parsed from TOML.
///
/// All fields have defaults. Load from TOML with
/// [`ProfileConfig::from_toml_file`] or start from [`ProfileConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Database endpoint.
    #[serde(default)]
    pub influx: InfluxConfig,
    /// Which readings to select.
    #[serde(default)]
    pub query: QueryConfig,
    /// Time span and slot length.
    #[serde(default)]
    pub window: WindowConfig,
}

/// Database endpoint parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InfluxConfig {
    /// Base URL of the HTTP API.
    pub url: String,
    /// Database name.
    pub database: String,
    /// Per-request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".to_string(),
            database: "meters".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Query shape: `"meter"`, `"table"`, or `"aggregated"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    pub kind: String,
    /// Field to average.
    pub power_column: String,
    /// Measurement name.
    pub table: String,
    /// Device regex; required for `"meter"`, optional for `"aggregated"`.
    pub device: Option<String>,
    /// Scale applied to every slot value.
    pub multiplier: f64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            kind: "meter".to_string(),
            power_column: "P".to_string(),
            table: "mqtt_consumer".to_string(),
            device: None,
            multiplier: 1.0,
        }
    }
}

/// Time span parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    /// Start as `YYYY-MM-DD HH:MM:SS`; today's UTC midnight when absent.
    pub start: Option<String>,
    /// Window length (minutes).
    pub duration_minutes: u32,
    /// Slot length (minutes).
    pub interval_minutes: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: None,
            duration_minutes: MINUTES_PER_DAY,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

impl WindowConfig {
    /// Parses `start`, or falls back to the current UTC day's midnight.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `start` is present but malformed.
    pub fn start(&self) -> std::result::Result<NaiveDateTime, ConfigError> {
        match &self.start {
            Some(raw) => parse_start(raw),
            None => Ok(Utc::now().date_naive().and_time(NaiveTime::default())),
        }
    }

    /// Builds the [`QueryWindow`] this section describes.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `start` is malformed.
    pub fn to_window(&self) -> std::result::Result<QueryWindow, ConfigError> {
        Ok(QueryWindow::new(
            self.start()?,
            TimeDelta::minutes(i64::from(self.duration_minutes)),
            self.interval_minutes,
        ))
    }
}

/// Parses a `YYYY-MM-DD HH:MM:SS` timestamp.
///
/// # Errors
///
/// Returns a `ConfigError` on `window.start` if the string does not match.
pub fn parse_start(raw: &str) -> std::result::Result<NaiveDateTime, ConfigError> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).map_err(|e| {
        ConfigError::new(
            "window.start",
            format!("cannot parse \"{raw}\" as YYYY-MM-DD HH:MM:SS: {e}"),
        )
    })
}

/// A query built from configuration, dispatching to the concrete kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfiguredQuery {
    Meter(MeterQuery),
    Table(TableQuery),
    Aggregated(AggregatedQuery),
}

impl Query for ConfiguredQuery {
    type Output = LoadProfile;

    fn query_string(&self) -> String {
        match self {
            Self::Meter(q) => q.query_string(),
            Self::Table(q) => q.query_string(),
            Self::Aggregated(q) => q.query_string(),
        }
    }

    fn transform(&self, result: QueryResult) -> LoadProfile {
        match self {
            Self::Meter(q) => q.transform(result),
            Self::Table(q) => q.transform(result),
            Self::Aggregated(q) => q.transform(result),
        }
    }
}

impl ProfileConfig {
    /// Supported values of `query.kind`.
    pub const KINDS: &[&str] = &["meter", "table", "aggregated"];

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> std::result::Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let db = &self.influx;
        if db.url.trim().is_empty() {
            errors.push(ConfigError::new("influx.url", "must not be empty"));
        }
        if db.database.trim().is_empty() {
            errors.push(ConfigError::new("influx.database", "must not be empty"));
        }

        let q = &self.query;
        if !Self::KINDS.contains(&q.kind.as_str()) {
            errors.push(ConfigError::new(
                "query.kind",
                format!(
                    "must be one of {}, got \"{}\"",
                    Self::KINDS.join(", "),
                    q.kind
                ),
            ));
        }
        if q.kind == "meter" && q.device.as_deref().is_none_or(str::is_empty) {
            errors.push(ConfigError::new(
                "query.device",
                "required when query.kind is \"meter\"",
            ));
        }
        if q.power_column.is_empty() {
            errors.push(ConfigError::new("query.power_column", "must not be empty"));
        }
        if q.table.is_empty() {
            errors.push(ConfigError::new("query.table", "must not be empty"));
        }
        if !q.multiplier.is_finite() {
            errors.push(ConfigError::new("query.multiplier", "must be finite"));
        }

        let w = &self.window;
        if w.interval_minutes == 0 {
            errors.push(ConfigError::new("window.interval_minutes", "must be > 0"));
        } else if MINUTES_PER_DAY % w.interval_minutes != 0 {
            errors.push(ConfigError::new(
                "window.interval_minutes",
                "must divide a day (1440 minutes) evenly",
            ));
        }
        if w.duration_minutes == 0 {
            errors.push(ConfigError::new("window.duration_minutes", "must be > 0"));
        }
        if let Some(raw) = &w.start
            && let Err(e) = parse_start(raw)
        {
            errors.push(e);
        }

        errors
    }

    /// Builds the query this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an unknown kind, a missing meter device, or
    /// a malformed start.
    pub fn build_query(&self) -> std::result::Result<ConfiguredQuery, ConfigError> {
        let q = &self.query;
        let window = self.window.to_window()?;
        match q.kind.as_str() {
            "meter" => {
                let device = q.device.clone().ok_or_else(|| {
                    ConfigError::new("query.device", "required when query.kind is \"meter\"")
                })?;
                Ok(ConfiguredQuery::Meter(
                    MeterQuery::new(&q.power_column, device, &q.table, window)
                        .with_multiplier(q.multiplier),
                ))
            }
            "table" => Ok(ConfiguredQuery::Table(
                TableQuery::new(&q.power_column, &q.table, window).with_multiplier(q.multiplier),
            )),
            "aggregated" => {
                let mut query = AggregatedQuery::new(&q.power_column, &q.table, window)
                    .with_multiplier(q.multiplier);
                query.device = q.device.clone();
                Ok(ConfiguredQuery::Aggregated(query))
            }
            other => Err(ConfigError::new(
                "query.kind",
                format!("unknown kind \"{other}\""),
            )),
        }
    }

    /// Opens an HTTP connection to the configured database.
    pub fn connect(&self) -> HttpConnection {
        HttpConnection::new(
            &self.influx.url,
            &self.influx.database,
            Duration::from_secs(self.influx.timeout_secs),
        )
    }

    /// Builds the query and runs it on `conn`.
    ///
    /// # Errors
    ///
    /// Returns configuration errors from [`ProfileConfig::build_query`] and any
    /// error the connection reports.
    pub fn fetch<C: Connection + ?Sized>(&self, conn: &C) -> Result<LoadProfile> {
        let query = self.build_query()?;
        query.exec(conn)
    }
}
