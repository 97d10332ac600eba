//! Single-device meter query.

use super::{Query, QueryWindow, mean_statement, single_series_profile};
use crate::influx::QueryResult;
use crate::profile::LoadProfile;

/// Mean power of one device, selected by an anchored regex on the `device` tag.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use meter_profile::query::{MeterQuery, Query, QueryWindow};
///
/// let start = NaiveDate::from_ymd_opt(2024, 3, 1)
///     .and_then(|d| d.and_hms_opt(0, 0, 0))
///     .unwrap();
/// let query = MeterQuery::new("P", "meter-7", "mqtt_consumer", QueryWindow::one_day(start, 15));
///
/// assert_eq!(
///     query.query_string(),
///     "SELECT mean(\"P\") FROM \"mqtt_consumer\" WHERE \"device\" =~ /^meter-7$/ \
///      AND time >= '2024-03-01 00:00:00' AND time <= '2024-03-02 00:00:00' \
///      GROUP BY time(15m) fill(0)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MeterQuery {
    /// Field to average, e.g. `P`.
    pub power_column: String,
    /// Regex body matched against the `device` tag, anchored on both ends.
    pub device: String,
    /// Measurement to read from.
    pub table: String,
    pub window: QueryWindow,
    /// Scale applied to every slot value.
    pub multiplier: f64,
}

impl MeterQuery {
    pub fn new(
        power_column: impl Into<String>,
        device: impl Into<String>,
        table: impl Into<String>,
        window: QueryWindow,
    ) -> Self {
        Self {
            power_column: power_column.into(),
            device: device.into(),
            table: table.into(),
            window,
            multiplier: 1.0,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Replaces the window used by subsequent statements.
    pub fn update_window(&mut self, window: QueryWindow) {
        self.window = window;
    }
}

impl Query for MeterQuery {
    type Output = LoadProfile;

    fn query_string(&self) -> String {
        mean_statement(
            &self.power_column,
            &self.table,
            Some(&self.device),
            &self.window,
            false,
        )
    }

    fn transform(&self, result: QueryResult) -> LoadProfile {
        single_series_profile(
            &self.query_string(),
            result,
            self.multiplier,
            self.window.interval_minutes,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use serde_json::json;

    use super::*;
    use crate::influx::Series;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    fn series(device: &str, rows: &[(&str, f64)]) -> Series {
        Series {
            name: "mqtt_consumer".into(),
            tags: Some([("device".to_string(), device.to_string())].into()),
            columns: vec!["time".into(), "mean".into()],
            values: rows.iter().map(|(t, v)| vec![json!(t), json!(v)]).collect(),
        }
    }

    #[test]
    fn update_window_changes_statement() {
        let mut query = MeterQuery::new("P", "m1", "t", QueryWindow::one_day(start(), 15));
        let before = query.query_string();
        query.update_window(QueryWindow::new(start(), TimeDelta::hours(6), 60));
        let after = query.query_string();

        assert_ne!(before, after);
        assert!(after.contains("time <= '2024-03-01 06:00:00'"));
        assert!(after.contains("GROUP BY time(60m)"));
    }

    #[test]
    fn device_slash_is_escaped() {
        let query = MeterQuery::new("P", "site/a", "t", QueryWindow::one_day(start(), 15));
        assert!(query.query_string().contains("=~ /^site\\/a$/"));
    }

    #[test]
    fn one_series_is_measured_and_scaled() {
        let query = MeterQuery::new("P", "m1", "t", QueryWindow::one_day(start(), 15))
            .with_multiplier(0.5);
        let result = QueryResult {
            series: vec![series(
                "m1",
                &[
                    ("2024-03-01T00:00:00Z", 100.0),
                    ("2024-03-01T00:15:00Z", 200.0),
                    ("2024-03-01T00:30:00Z", 300.0),
                ],
            )],
        };

        let profile = query.transform(result);
        assert!(!profile.is_zero_curve());
        assert_eq!(profile.profile().len(), 2);
        assert_eq!(profile.profile().get("00:15"), Some(100.0));
    }

    #[test]
    fn two_series_fall_back_to_zero_curve() {
        let query = MeterQuery::new("P", "m.*", "t", QueryWindow::one_day(start(), 15));
        let rows = [("2024-03-01T00:00:00Z", 1.0), ("2024-03-01T00:15:00Z", 1.0)];
        let result = QueryResult {
            series: vec![series("m1", &rows), series("m2", &rows)],
        };

        let profile = query.transform(result);
        assert!(profile.is_zero_curve());
        assert_eq!(profile.profile().len(), 96);
    }

    #[test]
    fn empty_result_falls_back_to_zero_curve() {
        let query = MeterQuery::new("P", "m1", "t", QueryWindow::one_day(start(), 60));
        let profile = query.transform(QueryResult::default());
        assert!(profile.is_zero_curve());
        assert_eq!(profile.profile().len(), 24);
    }
}
