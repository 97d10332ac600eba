//! InfluxQL profile queries.
//!
//! Every query renders one statement and reshapes its result. The concrete
//! kinds differ in the statement they render and in how many series they
//! accept:
//!
//! - [`MeterQuery`]: one device selected by a regex on the `device` tag
//! - [`TableQuery`]: a whole table without device filtering
//! - [`AggregatedQuery`]: many devices, summed per slot
//! - [`RawQuery`]: a caller-supplied statement and transform

pub mod aggregated;
pub mod meter;
pub mod raw;
pub mod table;
pub mod window;

pub use aggregated::AggregatedQuery;
pub use meter::MeterQuery;
pub use raw::RawQuery;
pub use table::TableQuery;
pub use window::{DEFAULT_INTERVAL_MINUTES, QueryWindow};

use tracing::warn;

use crate::error::Result;
use crate::influx::{Connection, QueryResult};
use crate::profile::{LoadProfile, Profile};

/// A statement plus the reshaping applied to what it returns.
pub trait Query {
    type Output;

    /// Renders the InfluxQL statement for the current parameters.
    fn query_string(&self) -> String;

    /// Reshapes the series returned for [`Query::query_string`].
    fn transform(&self, result: QueryResult) -> Self::Output;

    /// Runs the statement once on `conn` and transforms the result.
    ///
    /// # Errors
    ///
    /// Propagates every error the connection reports. Unusable results are
    /// handled by `transform`, not reported here.
    fn exec<C: Connection + ?Sized>(&self, conn: &C) -> Result<Self::Output> {
        let result = conn.query(&self.query_string())?;
        Ok(self.transform(result))
    }
}

/// Escapes `"` inside a double-quoted identifier.
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Escapes `/` inside a regex literal body.
pub(crate) fn regex_body(pattern: &str) -> String {
    pattern.replace('/', "\\/")
}

/// Renders `SELECT mean(..) FROM .. WHERE <filter>time bounds GROUP BY time(..)<extra> fill(0)`.
pub(crate) fn mean_statement(
    power_column: &str,
    table: &str,
    device: Option<&str>,
    window: &QueryWindow,
    group_by_device: bool,
) -> String {
    let device_filter = device
        .map(|d| format!("\"device\" =~ /^{}$/ AND ", regex_body(d)))
        .unwrap_or_default();
    let extra_group = if group_by_device { ", \"device\"" } else { "" };
    format!(
        "SELECT mean({}) FROM {} WHERE {}time >= '{}' AND time <= '{}' GROUP BY time({}m){} fill(0)",
        quote_ident(power_column),
        quote_ident(table),
        device_filter,
        window.start_string(),
        window.end_string(),
        window.interval_minutes,
        extra_group,
    )
}

/// Reshapes a result that must hold exactly one series.
pub(crate) fn single_series_profile(
    statement: &str,
    result: QueryResult,
    multiplier: f64,
    interval_minutes: u32,
) -> LoadProfile {
    let series = match result.series.as_slice() {
        [series] => series,
        all => {
            warn!(
                series = all.len(),
                %statement,
                "load profile query did not return exactly one series, using zero curve"
            );
            return LoadProfile::ZeroCurve(Profile::zero_curve(interval_minutes));
        }
    };

    match series.points() {
        Ok(points) => LoadProfile::Measured(Profile::from_points(points, multiplier)),
        Err(err) => {
            warn!(%err, %statement, "load profile series unusable, using zero curve");
            LoadProfile::ZeroCurve(Profile::zero_curve(interval_minutes))
        }
    }
}

/// Sums every returned series; only an empty result falls back.
pub(crate) fn summed_profile(
    statement: &str,
    result: QueryResult,
    multiplier: f64,
    interval_minutes: u32,
) -> LoadProfile {
    if result.is_empty() {
        warn!(%statement, "aggregated load profile query returned no series, using zero curve");
        return LoadProfile::ZeroCurve(Profile::zero_curve(interval_minutes));
    }

    let mut all_points = Vec::with_capacity(result.len());
    for series in &result.series {
        match series.points() {
            Ok(points) => all_points.push(points),
            Err(err) => {
                warn!(%err, %statement, "aggregated series unusable, using zero curve");
                return LoadProfile::ZeroCurve(Profile::zero_curve(interval_minutes));
            }
        }
    }
    LoadProfile::Measured(Profile::summed(all_points, multiplier))
}
