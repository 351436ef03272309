//! Report command - plain-text or JSON quality report.

use std::io::Write;
use std::path::Path;

use sieve::Exporter;

use super::{open, CommandResult};

pub fn run(file: &Path, json_output: bool, config: Option<&Path>) -> CommandResult {
    let (orchestrator, _) = open(file, config)?;
    let Some(profile) = orchestrator.profile() else {
        return Err("dataset was not profiled".into());
    };

    if json_output {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&Exporter::report_json(profile)?)?;
        writeln!(stdout)?;
    } else {
        print!("{}", Exporter::report(profile, None));
    }

    Ok(())
}
