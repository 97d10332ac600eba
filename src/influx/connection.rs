//! Query transport: the [`Connection`] seam and its InfluxDB HTTP implementation.

use std::time::Duration;

use tracing::debug;
use ureq::Agent;

use super::response::{QueryResponse, QueryResult};
use crate::error::{Error, Result};

/// Anything that can run one InfluxQL statement and return its series.
pub trait Connection {
    /// Executes `statement` and returns the series it produced.
    ///
    /// # Errors
    ///
    /// Transport failures, undecodable bodies, and database-reported statement
    /// errors are all returned to the caller.
    fn query(&self, statement: &str) -> Result<QueryResult>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn query(&self, statement: &str) -> Result<QueryResult> {
        (**self).query(statement)
    }
}

/// Blocking connection to the InfluxDB 1.x `/query` endpoint.
///
/// Non-2xx responses are still decoded so that the database's own error
/// message reaches the caller.
pub struct HttpConnection {
    agent: Agent,
    url: String,
    database: String,
}

impl HttpConnection {
    /// Creates a connection to `url` (e.g. `http://localhost:8086`) reading
    /// from `database`.
    ///
    /// # Arguments
    ///
    /// * `url` - Base URL of the InfluxDB HTTP API
    /// * `database` - Database name passed as `db`
    /// * `timeout` - Global timeout applied to each request
    pub fn new(url: &str, database: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            url: url.trim_end_matches('/').to_string(),
            database: database.to_string(),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    fn endpoint(&self) -> String {
        format!("{}/query", self.url)
    }
}

impl Connection for HttpConnection {
    fn query(&self, statement: &str) -> Result<QueryResult> {
        debug!(database = %self.database, %statement, "issuing influx query");
        let mut response = self
            .agent
            .get(&self.endpoint())
            .query("db", &self.database)
            .query("q", statement)
            .call()?;
        let status = response.status();
        let body: QueryResponse = response.body_mut().read_json()?;
        let result = body.into_result(statement)?;
        if !status.is_success() {
            return Err(Error::Influx {
                statement: statement.to_string(),
                message: format!("unexpected HTTP status {status}"),
            });
        }
        Ok(result)
    }
}
