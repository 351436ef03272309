//! Profile command - per-column quality metrics and suggestions.

use std::path::Path;

use colored::Colorize;

use super::{open, score, CommandResult};

pub fn run(file: &Path, json_output: bool, config: Option<&Path>) -> CommandResult {
    let (orchestrator, source) = open(file, config)?;
    let Some(profile) = orchestrator.profile() else {
        return Err("dataset was not profiled".into());
    };

    if json_output {
        let output = serde_json::json!({
            "source": source,
            "profile": profile,
            "kpis": profile.kpis(),
            "suggestions": orchestrator.suggestions(),
            "statistics": orchestrator.statistics(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} columns, {})",
        "Profiled".cyan().bold(),
        source.name.white(),
        source.row_count,
        source.column_count,
        source.format.label()
    );
    if profile.profiled_rows < profile.row_count {
        println!(
            "{} metrics computed on the first {} rows",
            "Note:".yellow(),
            profile.profiled_rows
        );
    }
    println!();

    println!(
        "  {:20} {:8} {:>6} {:>8} {:>6} {:>8} {:>8}",
        "column", "type", "score", "missing", "dups", "invalid", "outliers"
    );
    for c in &profile.columns {
        println!(
            "  {:20} {:8} {:>6} {:>7.1}% {:>5.1}% {:>7.1}% {:>7.1}%",
            c.name,
            c.detected_type.label(),
            score(c.quality_score),
            c.missing_pct,
            c.duplicate_pct,
            c.invalid_pct,
            c.outlier_pct
        );
    }
    println!();
    println!("Global score: {}", score(profile.global_score).bold());

    let suggestions: Vec<_> = orchestrator
        .suggestions()
        .values()
        .flatten()
        .filter(|s| !matches!(s.action, sieve::CorrectionAction::KeepAsIs))
        .collect();

    if suggestions.is_empty() {
        println!("{}", "No issues found - data looks clean!".green());
        return Ok(());
    }

    println!();
    println!("{}", "Suggestions:".yellow().bold());
    for s in suggestions {
        let mark = if s.selected_by_default { "[x]" } else { "[ ]" };
        println!("  {} {:32} {}", mark, s.id.white(), s.label);
    }
    println!();
    println!(
        "Run {} to apply the checked suggestions",
        format!("sieve apply {}", file.display()).cyan().bold()
    );

    Ok(())
}
