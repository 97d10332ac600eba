//! CSV export for load profiles.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;
use crate::profile::Profile;

/// Column header for profile CSV export.
const HEADER: [&str; 2] = ["time", "power"];

/// Exports a profile to a CSV file at the given path.
///
/// # Arguments
///
/// * `profile` - Profile to write, one row per slot
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_profile_csv(profile: &Profile, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_profile_csv(profile, buf)
}

/// Writes a profile as CSV to any writer.
///
/// Rows follow clock-time order; values carry four decimals.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_profile_csv(profile: &Profile, writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HEADER)?;

    for (slot, value) in profile.iter() {
        let value = format!("{value:.4}");
        wtr.write_record([slot, value.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}
