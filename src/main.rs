use std::process::ExitCode;
use std::sync::Arc;

use tracing::error;
use workflow_metrics::config::{load_config, print_schema};
use workflow_metrics::startup;
use workflow_metrics::utils::logger::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::args().skip(1).any(|arg| arg == "--schema") {
        print_schema();
        return ExitCode::SUCCESS;
    }

    let config = Arc::new(load_config());

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match startup::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Startup failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
