//! CLI command implementations.

pub mod apply;
pub mod plan;
pub mod profile;
pub mod report;

use std::path::Path;

use colored::{ColoredString, Colorize};
use sieve::{ProfileOrchestrator, SieveConfig, SourceMetadata};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load the configuration file, or defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<SieveConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(SieveConfig::load(p)?),
        None => Ok(SieveConfig::default()),
    }
}

/// Ingest `file` into a fresh orchestrator.
pub fn open(
    file: &Path,
    config: Option<&Path>,
) -> Result<(ProfileOrchestrator, SourceMetadata), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    let mut orchestrator = ProfileOrchestrator::with_config(load_config(config)?);
    let source = orchestrator.ingest_file(file)?;
    Ok((orchestrator, source))
}

/// Score colored by band.
pub fn score(value: f64) -> ColoredString {
    let text = format!("{:.1}", value);
    if value >= 90.0 {
        text.green()
    } else if value >= 70.0 {
        text.yellow()
    } else {
        text.red()
    }
}
