use std::path::PathBuf;

use clap::Parser;

/// Fetch a meter power profile from InfluxDB for the market simulator.
#[derive(Debug, Parser)]
#[command(name = "meter-profile", version, about)]
pub struct CliOptions {
    /// TOML configuration file; built-in defaults are used when absent.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Window start as "YYYY-MM-DD HH:MM:SS", overriding window.start.
    #[arg(long, value_name = "DATETIME")]
    pub start: Option<String>,

    /// Slot length in minutes, overriding window.interval_minutes.
    #[arg(long, value_name = "MINUTES")]
    pub interval: Option<u32>,

    /// Device regex, overriding query.device.
    #[arg(long, value_name = "PATTERN")]
    pub device: Option<String>,

    /// Scale factor, overriding query.multiplier.
    #[arg(long, allow_negative_numbers = true)]
    pub multiplier: Option<f64>,

    /// Write the profile as CSV to this path.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Print the InfluxQL statement and exit without querying.
    #[arg(long)]
    pub print_query: bool,
}
