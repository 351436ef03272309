//! CLI argument definitions using clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use sieve::ExportFormat;

/// Sieve: profile and clean tabular data
#[derive(Parser)]
#[command(name = "sieve")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Profile a data file and list suggested corrections
    Profile {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the default correction plan as JSON
    Plan {
        /// Path to the data file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path for the plan (default: <file>.plan.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a correction plan and write the cleaned data
    Apply {
        /// Path to the data file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Plan to apply (default: the suggestions selected by default)
        #[arg(long, value_name = "PLAN")]
        plan: Option<PathBuf>,

        /// Output path for cleaned data (default: <file>_clean.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (csv, tsv, json)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Print a data quality report
    Report {
        /// Path to the data file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use csv, tsv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Tsv => write!(f, "tsv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Tsv => ExportFormat::Tsv,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}
