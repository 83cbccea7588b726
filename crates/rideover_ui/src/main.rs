mod app;
mod logging;
mod ui;

use std::process::ExitCode;

use rideover_core::config::AppConfig;
use tracing::error;

use crate::app::RideApp;

fn main() -> ExitCode {
    logging::init();

    let config = match AppConfig::load_from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            eprintln!("rideover: {err}");
            return ExitCode::FAILURE;
        }
    };

    let app = match RideApp::new(config) {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "failed to start");
            eprintln!("rideover: {err}");
            return ExitCode::FAILURE;
        }
    };

    match ui::app_shell::run(app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "window closed with an error");
            ExitCode::FAILURE
        }
    }
}
