use crate::filter::HourRange;
use crate::types::{Action, Severity, SeverityThreshold, Source};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "applog", version, about)]
pub struct Cli {
    /// Path to configuration file
    #[clap(long, default_value = "./applog.toml")]
    pub config: PathBuf,

    /// Override the directory holding AppLog.log
    #[clap(long)]
    pub logs_path: Option<PathBuf>,

    /// Override the rotation size in whole megabytes
    #[clap(long)]
    pub max_size_mb: Option<u64>,

    /// Override the severity threshold (none, low, medium, high)
    #[clap(long)]
    pub threshold: Option<SeverityThreshold>,

    /// Override whether rotated logs are archived under "Old logs"
    #[clap(long)]
    pub keep_old_logs: Option<bool>,

    /// Disable logging regardless of the configuration file
    #[clap(long)]
    pub disabled: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Append one record
    Write {
        #[clap(long, default_value = "Information")]
        severity: Severity,
        #[clap(long, default_value = "Application")]
        source: Source,
        #[clap(long, default_value = "ApplicationStartup")]
        action: Action,
        /// Free text; must not contain '[' or ']'
        text: String,
    },

    /// Read every record, optionally filtered
    Read {
        #[clap(long)]
        contains: Option<String>,
        /// Exact date, YYYY-MM-DD
        #[clap(long)]
        date: Option<NaiveDate>,
        /// Hour range, HH:MM-HH:MM
        #[clap(long)]
        hours: Option<HourRange>,
        #[clap(long)]
        severity: Option<Severity>,
        #[clap(long)]
        source: Option<Source>,
        #[clap(long)]
        action: Option<Action>,
        /// Print records as JSON instead of log lines
        #[clap(long)]
        json: bool,
    },

    /// Rotate the log now, archiving it when configured
    Clear,

    /// Show the log file location, size and creation time
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub log_enabled: bool,
    pub severity_threshold: SeverityThreshold,
    pub max_size_mb: u64,
    pub keep_old_logs: bool,
    pub logs_path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_enabled: true,
            severity_threshold: SeverityThreshold::High,
            max_size_mb: 10,
            keep_old_logs: true,
            logs_path: PathBuf::from("./logs"),
        }
    }
}

pub fn load_config(cli: &Cli) -> Result<LogConfig> {
    let mut config = if cli.config.exists() {
        let config_content = fs::read_to_string(&cli.config)
            .with_context(|| format!("Failed to read config file: {:?}", cli.config))?;

        toml::from_str(&config_content).context("Failed to parse config file")?
    } else {
        info!("No config file at {:?}, using defaults", cli.config);
        LogConfig::default()
    };

    // Apply CLI overrides
    if let Some(ref logs_path) = cli.logs_path {
        config.logs_path = logs_path.clone();
    }

    if let Some(max_size_mb) = cli.max_size_mb {
        config.max_size_mb = max_size_mb;
    }

    if let Some(threshold) = cli.threshold {
        config.severity_threshold = threshold;
    }

    if let Some(keep_old_logs) = cli.keep_old_logs {
        config.keep_old_logs = keep_old_logs;
    }

    if cli.disabled {
        config.log_enabled = false;
    }

    Ok(config)
}
