mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init(&cli.log_level, cli.log_format) {
        eprintln!("tgzx: {e:#}");
        return ExitCode::FAILURE;
    }

    match commands::run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "command failed");
            ExitCode::FAILURE
        }
    }
}
