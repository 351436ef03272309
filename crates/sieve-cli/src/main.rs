//! Sieve CLI - tabular data profiling and correction.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use logging::{init_logging, LogConfig, LogFormat};

fn main() {
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(format));

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Profile { file, json } => commands::profile::run(&file, json, config),

        Commands::Plan { file, output } => commands::plan::run(&file, output, config),

        Commands::Apply {
            file,
            plan,
            output,
            format,
        } => commands::apply::run(&file, plan, output, format, config),

        Commands::Report { file, json } => commands::report::run(&file, json, config),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
