//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "triagectl")]
#[command(about = "Platform Issue Triage Tool - Scan log files for known errors", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the log file to analyze
    #[arg(short = 'l', long)]
    pub logfile: PathBuf,

    /// Maximum number of errors to display (default: show all)
    #[arg(short = 'e', long)]
    pub errors: Option<usize>,

    /// Path to the CSV file with error mappings
    #[arg(long, default_value = "error_mappings.csv")]
    pub mappings: PathBuf,

    /// Enable debug diagnostics
    #[arg(long)]
    pub verbose: bool,
}
