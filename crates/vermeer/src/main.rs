//! Vermeer CLI binary.
//!
//! Offline tools for operators:
//! - Validate cron expressions and preview fire times
//! - Check plan files before loading them
//! - Print the effective configuration

use clap::Parser;
use vermeer::cli::{Cli, run};
use vermeer::{VermeerConfig, init_logging};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = VermeerConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        let logging = config.logging().clone().with_level("debug".to_string());
        config = config.with_logging(logging);
    }
    init_logging(config.logging())?;

    run(&cli.command, &config)?;

    Ok(())
}
