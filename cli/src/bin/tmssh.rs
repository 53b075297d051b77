use std::process::ExitCode;

use tmcheck_cli::commands::session::{self, SessionLine};
use tmcheck_cli::terminal::logging;
use tmcheck_common::config::Settings;
use tmcheck_common::error::Error;
use tracing::error;

fn main() -> ExitCode {
    let line: SessionLine = SessionLine::parse_args();
    logging::init_logging();
    let settings: Settings = Settings::from_env();

    match session::run(&line, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.downcast_ref::<Error>().is_some_and(Error::is_cancelled) => {
            tmcheck_common::info!("cancelled");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
