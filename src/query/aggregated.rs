//! Multi-meter query whose series are summed into one profile.

use super::{Query, QueryWindow, mean_statement, summed_profile};
use crate::influx::QueryResult;
use crate::profile::LoadProfile;

/// Mean power per device, grouped by the `device` tag and summed per slot.
///
/// Without a device pattern every device in the table contributes.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedQuery {
    pub power_column: String,
    pub table: String,
    /// Optional regex body restricting which devices are summed.
    pub device: Option<String>,
    pub window: QueryWindow,
    pub multiplier: f64,
}

impl AggregatedQuery {
    pub fn new(power_column: impl Into<String>, table: impl Into<String>, window: QueryWindow) -> Self {
        Self {
            power_column: power_column.into(),
            table: table.into(),
            device: None,
            window,
            multiplier: 1.0,
        }
    }

    pub fn with_device(mut self, pattern: impl Into<String>) -> Self {
        self.device = Some(pattern.into());
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn update_window(&mut self, window: QueryWindow) {
        self.window = window;
    }
}

impl Query for AggregatedQuery {
    type Output = LoadProfile;

    fn query_string(&self) -> String {
        mean_statement(
            &self.power_column,
            &self.table,
            self.device.as_deref(),
            &self.window,
            true,
        )
    }

    fn transform(&self, result: QueryResult) -> LoadProfile {
        summed_profile(
            &self.query_string(),
            result,
            self.multiplier,
            self.window.interval_minutes,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::json;

    use super::*;
    use crate::influx::Series;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    fn series(device: &str, values: [f64; 3]) -> Series {
        let times = [
            "2024-03-01T00:00:00Z",
            "2024-03-01T00:15:00Z",
            "2024-03-01T00:30:00Z",
        ];
        Series {
            name: "mqtt_consumer".into(),
            tags: Some([("device".to_string(), device.to_string())].into()),
            columns: vec!["time".into(), "mean".into()],
            values: times
                .iter()
                .zip(values)
                .map(|(t, v)| vec![json!(t), json!(v)])
                .collect(),
        }
    }

    #[test]
    fn statement_groups_by_device() {
        let query = AggregatedQuery::new("P", "mqtt_consumer", QueryWindow::one_day(start(), 15))
            .with_device("house-.*");
        let statement = query.query_string();
        assert!(statement.contains("WHERE \"device\" =~ /^house-.*$/ AND time >= "));
        assert!(statement.ends_with("GROUP BY time(15m), \"device\" fill(0)"));
    }

    #[test]
    fn statement_without_pattern_reads_all_devices() {
        let query = AggregatedQuery::new("P", "mqtt_consumer", QueryWindow::one_day(start(), 15));
        assert!(!query.query_string().contains("=~"));
    }

    #[test]
    fn series_are_summed_per_slot() {
        let query = AggregatedQuery::new("P", "t", QueryWindow::one_day(start(), 15))
            .with_multiplier(2.0);
        let result = QueryResult {
            series: vec![series("a", [1.0, 2.0, 3.0]), series("b", [10.0, 20.0, 30.0])],
        };

        let profile = query.transform(result);
        assert!(!profile.is_zero_curve());
        assert_eq!(profile.profile().len(), 2);
        assert_eq!(profile.profile().get("00:00"), Some(22.0));
        assert_eq!(profile.profile().get("00:15"), Some(44.0));
    }

    #[test]
    fn single_series_is_accepted() {
        let query = AggregatedQuery::new("P", "t", QueryWindow::one_day(start(), 15));
        let result = QueryResult {
            series: vec![series("a", [1.0, 2.0, 3.0])],
        };
        assert_eq!(query.transform(result).profile().get("00:15"), Some(2.0));
    }

    #[test]
    fn no_series_falls_back() {
        let query = AggregatedQuery::new("P", "t", QueryWindow::one_day(start(), 15));
        let profile = query.transform(QueryResult::default());
        assert!(profile.is_zero_curve());
    }
}
