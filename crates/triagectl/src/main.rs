//! Triage Control - scan log files for known errors from the terminal.

use anyhow::Result;
use clap::Parser;
use tracing::Level;

use triagectl::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let max_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt().with_max_level(max_level).init();

    let code = triagectl::run(&cli)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
