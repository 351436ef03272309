//! Plan command - write the default correction plan for editing.

use std::path::{Path, PathBuf};

use colored::Colorize;

use super::{open, CommandResult};

pub fn run(file: &Path, output: Option<PathBuf>, config: Option<&Path>) -> CommandResult {
    let (orchestrator, _) = open(file, config)?;
    let plan = orchestrator.current_plan();

    let output_path = output.unwrap_or_else(|| {
        let stem = file.file_stem().unwrap_or_default().to_string_lossy();
        file.with_file_name(format!("{}.plan.json", stem))
    });
    plan.save(&output_path)?;

    println!(
        "{} {} actions on {} columns to {}",
        "Wrote".green().bold(),
        plan.len().to_string().white().bold(),
        plan.columns().count(),
        output_path.display().to_string().white()
    );
    for (column, suggestion) in plan.iter() {
        println!("  {:20} {}", column, suggestion.label);
    }
    println!();
    println!(
        "Edit the plan, then run {}",
        format!(
            "sieve apply {} --plan {}",
            file.display(),
            output_path.display()
        )
        .cyan()
    );

    Ok(())
}
