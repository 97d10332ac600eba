//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use meter_profile::influx::{Connection, QueryResult};
use meter_profile::{Error, Result};

/// Connection that replays a canned JSON body and records each statement.
pub struct FixtureConnection {
    body: String,
    pub statements: RefCell<Vec<String>>,
}

impl FixtureConnection {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            statements: RefCell::new(Vec::new()),
        }
    }

    pub fn issued(&self) -> Vec<String> {
        self.statements.borrow().clone()
    }
}

impl Connection for FixtureConnection {
    fn query(&self, statement: &str) -> Result<QueryResult> {
        self.statements.borrow_mut().push(statement.to_string());
        QueryResult::from_json(&self.body, statement)
    }
}

/// Connection that always fails as if the database were unreachable.
pub struct UnreachableConnection;

impl Connection for UnreachableConnection {
    fn query(&self, _statement: &str) -> Result<QueryResult> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        )))
    }
}

/// 2024-03-01 00:00:00, the start of every fixture window.
pub fn fixture_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// RFC 3339 timestamps for `count` consecutive slots from [`fixture_start`].
pub fn slot_times(count: usize, interval_minutes: i64) -> Vec<String> {
    (0..count)
        .map(|i| {
            let ts = fixture_start() + TimeDelta::minutes(interval_minutes * i as i64);
            format!("{}Z", ts.format("%Y-%m-%dT%H:%M:%S"))
        })
        .collect()
}

/// One `series` JSON object for `device` with the given slot values.
pub fn series_json(device: &str, values: &[f64], interval_minutes: i64) -> String {
    let rows: Vec<String> = slot_times(values.len(), interval_minutes)
        .iter()
        .zip(values)
        .map(|(t, v)| format!("[\"{t}\",{v}]"))
        .collect();
    format!(
        r#"{{"name":"mqtt_consumer","tags":{{"device":"{device}"}},"columns":["time","mean"],"values":[{}]}}"#,
        rows.join(",")
    )
}

/// A full response body wrapping the given series objects.
pub fn response_json(series: &[String]) -> String {
    if series.is_empty() {
        return r#"{"results":[{"statement_id":0}]}"#.to_string();
    }
    format!(
        r#"{{"results":[{{"statement_id":0,"series":[{}]}}]}}"#,
        series.join(",")
    )
}

/// A full day of 15-minute readings: 97 buckets for `start..=end`.
pub fn full_day_values(watts: f64) -> Vec<f64> {
    vec![watts; 97]
}
