use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use unbom_io_fs::{OutputConsole, strip_tree};
use unbom_log::init_logging;

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.log_options()) {
        eprintln!("{e}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Per-file failures are reported in the summary and never fail the run.
fn run(cli: &Cli) -> Result<()> {
    let spec_options = cli.strip_options();
    let if_styled = !cli.no_color
        && std::env::var_os("NO_COLOR").is_none()
        && std::io::stdout().is_terminal();
    let console = OutputConsole::stdout(if_styled);

    strip_tree(&spec_options, &console)
        .with_context(|| format!("Cannot process {}", spec_options.path_root.display()))?;
    Ok(())
}
