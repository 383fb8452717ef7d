//! Main application entry point (service binary).
//!
//! This is a thin wrapper around the `site_pulse` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use site_pulse::initialization::init_logger_with;
use site_pulse::{run_server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env (if present); CHROME_PATH can be
    // set there instead of exported
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    if let Err(e) = config.validate() {
        eprintln!("site_pulse error: {e}");
        process::exit(2);
    }

    match run_server(config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("site_pulse error: {e:#}");
            process::exit(1);
        }
    }
}
