//! Meter power profiles from InfluxDB for energy-market simulation.

pub mod config;
pub mod error;
/// InfluxDB transport and response model.
pub mod influx;
pub mod io;
pub mod profile;
pub mod query;

pub use error::{ConfigError, Error, Result};
pub use profile::{LoadProfile, Profile};
