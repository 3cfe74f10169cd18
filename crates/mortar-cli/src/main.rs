//! `mortar`: generate and incrementally update the layers of a Go service
//! from an entity model.
//!
//! Exit codes:
//!
//! | code | meaning                                   |
//! |------|-------------------------------------------|
//! |  0   | success                                   |
//! |  1   | internal or filesystem error              |
//! |  2   | bad arguments or invalid model            |
//! |  3   | model file not found                      |
//! |  4   | configuration error                       |
//! |  5   | some files were left unmerged (conflicts) |

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument};

use crate::{
    cli::{Cli, Commands},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

fn main() -> ExitCode {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}", e.render().ansi());
            return ExitCode::from(2);
        }
    };

    if let Err(e) = init_logging(&cli.global) {
        eprintln!("{e}");
        return ExitCode::from(1);
    }

    let verbose = cli.global.verbose > 0;
    match run(cli) {
        Ok(()) => {
            info!("Mortar completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e, verbose),
    }
}

/// Load configuration, then dispatch.
#[instrument(skip_all)]
fn run(cli: Cli) -> CliResult<()> {
    debug!(
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        config = ?cli.global.config,
        "CLI started"
    );

    let config = AppConfig::load(cli.global.config.as_ref())?;
    let output = OutputManager::new(&cli.global, &config);

    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, config, output),
    }
}

/// Print the error on stderr, coloured when stderr is a terminal, and map it
/// to an exit code.
fn report_error(err: &CliError, verbose: bool) -> ExitCode {
    err.log();
    let msg = if std::io::stderr().is_terminal() {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{msg}");
    ExitCode::from(err.exit_code())
}
