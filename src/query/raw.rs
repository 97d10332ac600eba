//! Query with a caller-supplied statement and transform.

use super::Query;
use crate::influx::QueryResult;

/// A fixed statement paired with an arbitrary transform.
///
/// # Examples
///
/// ```
/// use meter_profile::influx::QueryResult;
/// use meter_profile::query::{Query, RawQuery};
///
/// let count = RawQuery::new("SHOW MEASUREMENTS", |r: QueryResult| r.len());
/// assert_eq!(count.query_string(), "SHOW MEASUREMENTS");
/// assert_eq!(count.transform(QueryResult::default()), 0);
/// ```
pub struct RawQuery<F> {
    statement: String,
    transform: F,
}

impl<F, T> RawQuery<F>
where
    F: Fn(QueryResult) -> T,
{
    pub fn new(statement: impl Into<String>, transform: F) -> Self {
        Self {
            statement: statement.into(),
            transform,
        }
    }
}

impl<F, T> Query for RawQuery<F>
where
    F: Fn(QueryResult) -> T,
{
    type Output = T;

    fn query_string(&self) -> String {
        self.statement.clone()
    }

    fn transform(&self, result: QueryResult) -> T {
        (self.transform)(result)
    }
}
