//! InfluxDB 1.x client surface: transport and response model.

pub mod connection;
pub mod response;

pub use connection::{Connection, HttpConnection};
pub use response::{QueryResult, Series};
