use anyhow::{Context, Result};
use applog::codec;
use applog::config::Command;
use applog::{FilterEngine, FilterSettings, LogRecord, LogStore, WriteOutcome};
use log::{info, warn};

pub fn execute_command(cmd: &Command, store: &LogStore) -> Result<()> {
    match cmd {
        Command::Write {
            severity,
            source,
            action,
            text,
        } => {
            if text.contains(['[', ']', '\n']) {
                warn!("Record text contains delimiter characters; it may not read back intact");
            }

            let record = LogRecord::now(text.as_str(), *source, *severity, *action);
            match store.write(&record).context("Failed to write record")? {
                WriteOutcome::Disabled => info!("Logging disabled, record not written"),
                WriteOutcome::Dropped => info!("Record below severity threshold, not written"),
                WriteOutcome::Appended => info!("Record written"),
                WriteOutcome::Rotated => info!("Record written, log file rotated"),
            }
        }

        Command::Read {
            contains,
            date,
            hours,
            severity,
            source,
            action,
            json,
        } => {
            let records = store.read_all().context("Failed to read log file")?;

            let mut settings = FilterSettings::default();
            if let Some(needle) = contains {
                settings = settings.with_text(needle.as_str());
            }
            if let Some(date) = date {
                settings = settings.with_date(*date);
            }
            if let Some(hours) = hours {
                settings = settings.with_hours(*hours);
            }
            if let Some(severity) = severity {
                settings = settings.with_severity(*severity);
            }
            if let Some(source) = source {
                settings = settings.with_source(*source);
            }
            if let Some(action) = action {
                settings = settings.with_action(*action);
            }

            let view = FilterEngine::new(&records).view(&settings);
            info!("Showing {} of {} records", view.len(), records.len());

            if *json {
                println!("{}", serde_json::to_string_pretty(&*view)?);
            } else {
                for record in view.iter() {
                    println!("{}", codec::encode(record));
                }
            }
        }

        Command::Clear => {
            store.clear().context("Failed to clear log file")?;
            info!("Log file cleared");
        }

        Command::Info => match store.file_path() {
            Some(path) => {
                println!("path:    {}", path.display());
                println!("size:    {} bytes", store.size_bytes()?);
                if let Some(created) = store.creation_timestamp() {
                    println!("created: {}", created);
                }
            }
            None => println!("log store not open (logging disabled)"),
        },
    }

    Ok(())
}
