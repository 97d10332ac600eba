//! Whole-table query without device filtering.

use super::{Query, QueryWindow, mean_statement, single_series_profile};
use crate::influx::QueryResult;
use crate::profile::LoadProfile;

/// Mean power over an entire measurement, for tables that hold a single meter.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub power_column: String,
    pub table: String,
    pub window: QueryWindow,
    pub multiplier: f64,
}

impl TableQuery {
    pub fn new(power_column: impl Into<String>, table: impl Into<String>, window: QueryWindow) -> Self {
        Self {
            power_column: power_column.into(),
            table: table.into(),
            window,
            multiplier: 1.0,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn update_window(&mut self, window: QueryWindow) {
        self.window = window;
    }
}

impl Query for TableQuery {
    type Output = LoadProfile;

    fn query_string(&self) -> String {
        mean_statement(&self.power_column, &self.table, None, &self.window, false)
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
