// reqguard/src/main.rs
//! reqguard entry point.
//!
//! Exit codes: 0 on success, 1 when a record is rejected, 2 on any other error.

use std::process::ExitCode;

use clap::Parser;
use log::{error, LevelFilter};

use reqguard::cli::{Cli, Commands};
use reqguard::commands::{sanitize::run_sanitize, validate::run_validate};
use reqguard::logger;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let level = if args.quiet {
        Some(LevelFilter::Off)
    } else if args.debug {
        Some(LevelFilter::Debug)
    } else {
        None
    };
    logger::init_logger(level);

    let result = match &args.command {
        Commands::Validate(cmd) => run_validate(cmd).await,
        Commands::Sanitize(cmd) => run_sanitize(cmd).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("reqguard: {:#}", e);
            ExitCode::from(2)
        }
    }
}
