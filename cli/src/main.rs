use std::process::ExitCode;

use tmcheck_cli::commands::{self, CommandLine, Prepared};
use tmcheck_cli::terminal::{logging, print};
use tmcheck_common::config::Settings;
use tmcheck_common::error::Error;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_logging();
    let settings: Settings = Settings::from_env();

    // Help is checked before clap so that `-help` is not read as `-h -e -l -p`.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if commands::usage_requested(&args) {
        commands::print_usage(&settings);
        return ExitCode::SUCCESS;
    }

    let line: CommandLine = CommandLine::parse_args();
    let prepared: Prepared = match commands::prepare(&line, &settings) {
        Ok(Some(prepared)) => prepared,
        Ok(None) => {
            commands::print_usage(&settings);
            return ExitCode::SUCCESS;
        }
        Err(e) => return exit_with(e),
    };

    // Sinks write whole record groups synchronously, so dropping the run
    // between two awaits leaves no partial row behind.
    tokio::select! {
        result = commands::dispatch(&prepared, &settings) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => exit_with(e),
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            print::print("");
            tmcheck_common::warn!("interrupted by user, stopping");
            ExitCode::SUCCESS
        }
    }
}

fn exit_with(e: anyhow::Error) -> ExitCode {
    if e.downcast_ref::<Error>().is_some_and(Error::is_cancelled) {
        tmcheck_common::info!("cancelled");
        return ExitCode::SUCCESS;
    }
    error!("{e:#}");
    ExitCode::FAILURE
}
