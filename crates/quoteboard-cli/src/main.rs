mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use quoteboard_core::{init_logging, LogConfig, LogFormat};
use std::process::ExitCode;

use crate::cli::{Cli, LogFormatArg};
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if let Some(format) = cli.log_format {
        log_config = log_config.with_format(match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        });
    }
    if let Err(error) = init_logging(log_config) {
        eprintln!("warning: logging disabled: {error}");
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let data = commands::run(cli).await?;
    output::render(&data, cli.pretty)
}
