//! Apply command - run a correction plan and export cleaned data.

use std::path::{Path, PathBuf};

use colored::Colorize;
use sieve::{CancelToken, CorrectionPlan, DeclaredFormat, ExportFormat, Exporter};

use crate::cli::OutputFormat;

use super::{open, score, CommandResult};

pub fn run(
    file: &Path,
    plan: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    config: Option<&Path>,
) -> CommandResult {
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())?;

    let output_path = apply_and_save(file, plan, output, format, config, &cancel)?;

    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );

    Ok(())
}

/// Apply the plan and write the result, returning the output path.
///
/// An empty plan still writes the dataset, unchanged.
fn apply_and_save(
    file: &Path,
    plan: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    config: Option<&Path>,
    cancel: &CancelToken,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let (mut orchestrator, source) = open(file, config)?;

    let plan = match plan {
        Some(path) => CorrectionPlan::load(&path)?,
        None => orchestrator.current_plan(),
    };

    if plan.is_empty() {
        println!(
            "{} Plan is empty; writing the data unchanged.",
            "Warning:".yellow().bold()
        );
    } else {
        println!(
            "{} {} actions to {}",
            "Applying".cyan().bold(),
            plan.len().to_string().white().bold(),
            source.name.white()
        );
    }

    let report = orchestrator.apply_plan_with_cancel(&plan, cancel)?;

    println!();
    if report.log.is_empty() {
        println!("{}", "Nothing changed.".green());
    }
    for line in &report.log {
        println!("  {} {}", "-".dimmed(), line);
    }
    if !report.converged {
        println!(
            "{} corrections did not settle after {} passes",
            "Warning:".yellow().bold(),
            report.passes
        );
    }

    println!();
    println!(
        "Score: {} -> {}   Rows: {} -> {}",
        score(report.score_before),
        score(report.score_after),
        report.rows_before,
        report.rows_after
    );

    let format: ExportFormat = match (format, &output) {
        (Some(f), _) => f.into(),
        (None, Some(path)) => ExportFormat::from_path(path)?,
        (None, None) => match source.format {
            DeclaredFormat::Tsv => ExportFormat::Tsv,
            DeclaredFormat::Json => ExportFormat::Json,
            _ => ExportFormat::Csv,
        },
    };

    let output_path = output.unwrap_or_else(|| {
        let stem = file.file_stem().unwrap_or_default().to_string_lossy();
        file.with_file_name(format!("{}_clean.{}", stem, format.extension()))
    });

    let Some(dataset) = orchestrator.dataset() else {
        return Err("no dataset after apply".into());
    };
    Exporter::save(dataset, &output_path, format)?;

    Ok(output_path)
}
