//! Crew Commander - multi-agent AI orchestration CLI.

use std::process::ExitCode;

mod cli;
mod config;
mod error;
mod exec;
mod guard;
mod logging;
mod parser;
mod session;
mod tmux;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging; the guard must live until exit.
    let _guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();

    match cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
