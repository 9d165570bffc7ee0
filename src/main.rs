mod commands;

use anyhow::Result;
use applog::config;
use applog::LogStore;
use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()?;

    // Parse command-line arguments
    let cli = config::Cli::parse();

    // Load configuration
    let config = config::load_config(&cli)?;
    info!("Configuration loaded successfully");

    let store = LogStore::new(config.clone());
    store.initialize(&config.logs_path)?;

    commands::execute_command(&cli.command, &store)
}
