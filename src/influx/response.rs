//! InfluxDB 1.x JSON response model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result, SeriesError};

/// Raw `/query` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<StatementResult>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of one statement inside a response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub statement_id: u32,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One result series: a measurement, optionally split by tag values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// All series returned for a statement, flattened across statement results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub series: Vec<Series>,
}

impl QueryResponse {
    /// Converts the response into a [`QueryResult`], surfacing any error the
    /// database reported for `statement`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Influx`] if the response or any statement carries an
    /// `error` field.
    pub fn into_result(self, statement: &str) -> Result<QueryResult> {
        if let Some(message) = self.error {
            return Err(Error::Influx {
                statement: statement.to_string(),
                message,
            });
        }

        let mut series = Vec::new();
        for result in self.results {
            if let Some(message) = result.error {
                return Err(Error::Influx {
                    statement: statement.to_string(),
                    message,
                });
            }
            series.extend(result.series);
        }
        Ok(QueryResult { series })
    }
}

impl QueryResult {
    /// Parses a raw JSON body and converts it as [`QueryResponse::into_result`] does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for invalid JSON and [`Error::Influx`] for
    /// database-reported errors.
    pub fn from_json(body: &str, statement: &str) -> Result<Self> {
        let response: QueryResponse = serde_json::from_str(body)?;
        response.into_result(statement)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl Series {
    /// Returns the value of a tag, if the series was grouped by it.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_ref()?.get(key).map(String::as_str)
    }

    /// Label used in log output: the measurement name plus its tags.
    pub fn label(&self) -> String {
        match &self.tags {
            Some(tags) if !tags.is_empty() => {
                let tags: Vec<String> = tags.iter().map(|(k, v)| format!("{k}={v}")).collect();
                format!("{}[{}]", self.name, tags.join(","))
            }
            _ => self.name.clone(),
        }
    }

    /// Extracts `(timestamp, value)` pairs from the `time` column and the value
    /// column (`mean` if present, otherwise the first non-time column).
    ///
    /// `null` values count as `0.0`.
    ///
    /// # Errors
    ///
    /// Returns a [`SeriesError`] if either column is missing or a row carries an
    /// unparsable timestamp or a non-numeric value.
    pub fn points(&self) -> std::result::Result<Vec<(DateTime<Utc>, f64)>, SeriesError> {
        let time_idx = self
            .columns
            .iter()
            .position(|c| c == "time")
            .ok_or_else(|| SeriesError::MissingTimeColumn(self.label()))?;
        let value_idx = self
            .columns
            .iter()
            .position(|c| c == "mean")
            .or_else(|| self.columns.iter().position(|c| c != "time"))
            .ok_or_else(|| SeriesError::MissingValueColumn(self.label()))?;

        self.values
            .iter()
            .enumerate()
            .map(|(row, values)| {
                let ts = values
                    .get(time_idx)
                    .and_then(parse_timestamp)
                    .ok_or_else(|| SeriesError::BadTimestamp {
                        series: self.label(),
                        row,
                    })?;
                let value = match values.get(value_idx) {
                    None | Some(Value::Null) => 0.0,
                    Some(v) => v.as_f64().ok_or_else(|| SeriesError::BadValue {
                        series: self.label(),
                        row,
                    })?,
                };
                Ok((ts, value))
            })
            .collect()
    }
}

/// Accepts RFC 3339 strings (the default precision) and integer epoch
/// nanoseconds (`epoch=ns`).
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().map(DateTime::from_timestamp_nanos),
        _ => None,
    }
}
