//! `cmdslotd [PORT]`: runs the command server until interrupted.

use std::process::ExitCode;

use cmdslot_config::Config;

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => error.exit(),
    };

    if let Err(error) = cmdslotd::telemetry::initialise(config.logging()) {
        eprintln!("cmdslotd: {error}");
        return ExitCode::FAILURE;
    }

    match cmdslotd::start_server(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("cmdslotd: {error}");
            ExitCode::FAILURE
        }
    }
}
