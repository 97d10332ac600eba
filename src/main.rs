//! Profile fetcher entry point: CLI wiring and config-driven query construction.

mod cli;

use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::CliOptions;
use meter_profile::config::ProfileConfig;
use meter_profile::io::export::export_profile_csv;
use meter_profile::query::Query;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Applies command-line overrides on top of the loaded configuration.
fn apply_overrides(cfg: &mut ProfileConfig, cli: &CliOptions) {
    if let Some(start) = &cli.start {
        cfg.window.start = Some(start.clone());
    }
    if let Some(interval) = cli.interval {
        cfg.window.interval_minutes = interval;
    }
    if let Some(device) = &cli.device {
        cfg.query.device = Some(device.clone());
    }
    if let Some(multiplier) = cli.multiplier {
        cfg.query.multiplier = multiplier;
    }
}

fn main() {
    init_tracing();
    let cli = CliOptions::parse();

    let mut cfg = match &cli.config {
        Some(path) => match ProfileConfig::from_toml_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("{e}");
                process::exit(1);
            }
        },
        None => ProfileConfig::default(),
    };
    apply_overrides(&mut cfg, &cli);

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("{e}");
        }
        process::exit(1);
    }

    let query = match cfg.build_query() {
        Ok(q) => q,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    if cli.print_query {
        println!("{}", query.query_string());
        return;
    }

    let conn = cfg.connect();
    let profile = match query.exec(&conn) {
        Ok(p) => p,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    if profile.is_zero_curve() {
        info!("no usable readings, emitting zero curve");
    }
    print!("{}", profile.profile());

    if let Some(path) = &cli.out {
        if let Err(e) = export_profile_csv(profile.profile(), path) {
            error!("failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), slots = profile.profile().len(), "profile written");
    }
}
