//! Lamina CLI Binary
//!
//! Command-line interface for installing the Lamina observability layer
//! on serverless functions.

use clap::Parser;
use lamina::config::Settings;
use lamina::error::ApiError;
use lamina::logging;
use lamina::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let mut settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    };
    cli.apply_logging_overrides(&mut settings.logging);

    if let Err(e) = logging::init_logging(Some(&settings.logging)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    let context = match CliContext::new(settings) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        // Missing region/credentials get the one-line guidance alone;
        // everything else keeps the originating error's message.
        Err(e @ (ApiError::RegionMissing | ApiError::CredentialsMissing)) => {
            eprintln!("{}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
