//! Triage Control - CLI front end for the platform log triage tool.

pub mod cli;
pub mod display;

use anyhow::Result;
use triage_common::{LogScanner, MappingLoader, ScanCondition, TriageReport};

use crate::cli::Cli;

/// Run a full triage pass. Returns the process exit code.
pub fn run(cli: &Cli) -> Result<i32> {
    if let Some(errors) = cli.errors {
        if errors < 1 {
            display::print_error("Number of errors to display must be at least 1.");
            return Ok(1);
        }
    }

    display::print_banner();

    let loader = MappingLoader::new(&cli.mappings);
    let mappings = match loader.load() {
        Ok(mappings) => mappings,
        Err(e) => {
            display::print_error(&e.to_string());
            return Ok(1);
        }
    };
    display::print_loaded(mappings.len(), loader.path());

    if let Ok(meta) = std::fs::metadata(&cli.logfile) {
        if meta.len() > 0 {
            display::print_scanning(&cli.logfile, meta.len());
        }
    }

    let scanner = LogScanner::new(&mappings);
    let outcome = match scanner.scan(&cli.logfile) {
        Ok(outcome) => outcome,
        Err(e) => {
            display::print_error(&e.to_string());
            return Ok(1);
        }
    };

    match outcome.condition {
        Some(ScanCondition::SourceNotFound) => {
            display::print_warning(&format!("Log file '{}' not found.", cli.logfile.display()));
        }
        Some(ScanCondition::EmptySource) => {
            display::print_warning("Log file is empty.");
        }
        None => {}
    }

    let report = TriageReport::new(&outcome.matches, mappings.len(), cli.errors);
    display::print_results(&report);
    display::print_summary(report.total_errors);

    Ok(0)
}
