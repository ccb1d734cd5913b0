use errkit_core::{config, logging};

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    let cfg = match config::load_or_init() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("errkit error: failed to load config: {:#}", err);
            std::process::exit(1);
        }
    };

    // File logging first; a read-only state dir must not stop the CLI.
    let filter = cfg.log_filter.as_deref();
    if let Err(err) = logging::init_logging(filter) {
        logging::init_logging_stderr(filter);
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    match CliCommand::run_from_args(&cfg).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("errkit error: {:#}", err);
            std::process::exit(1);
        }
    }
}
