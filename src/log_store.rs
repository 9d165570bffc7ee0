//! File-backed application log.
//!
//! `AppLog.log` starts with a three line header (a title line carrying the
//! creation date, then two blank lines) followed by one encoded record per
//! line. Blank lines between records are separators left by earlier
//! sessions and are skipped on read.

use crate::codec;
use crate::config::LogConfig;
use crate::error::StoreError;
use crate::gate::AvailabilityGate;
use crate::log_entry::LogRecord;
use crate::rotation;
use chrono::{Local, NaiveDateTime, Timelike};
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const LOG_FILE_NAME: &str = "AppLog.log";
pub const HEADER_LINES: usize = 3;
pub const HEADER_TITLE: &str = "Application Log File";
pub const HEADER_DATE_FORMAT: &str = "%m-%d-%Y %H-%M-%S";

/// A file of exactly this length holds only the byte-order mark left behind
/// by an earlier truncation and is treated as empty.
const STALE_PREAMBLE_LEN: u64 = 3;

/// What `LogStore::write` did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Logging is switched off.
    Disabled,
    /// The severity threshold rejected the record.
    Dropped,
    Appended,
    /// Appended, then the size cap rotated the file.
    Rotated,
}

/// Open backing file. Only ever touched through the gate.
pub(crate) struct LogFile {
    pub(crate) path: PathBuf,
    pub(crate) file: File,
    pub(crate) created: NaiveDateTime,
}

impl LogFile {
    /// Open an existing log for appending, or start a new one.
    pub(crate) fn open(path: PathBuf) -> Result<Self, StoreError> {
        // Other processes may keep reading the file while it is held open.
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let len = file.metadata()?.len();
        if len == 0 || len == STALE_PREAMBLE_LEN {
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            let created = now();
            file.write_all(header(created).as_bytes())?;
            debug!("Started new log file {}", path.display());
            return Ok(Self { path, file, created });
        }

        let mut log = Self {
            path,
            file,
            created: now(),
        };
        match log.header_line()?.as_deref().and_then(parse_creation) {
            Some(created) => log.created = created,
            None => warn!(
                "Unreadable header in {}, using current time as creation date",
                log.path.display()
            ),
        }
        log.file.seek(SeekFrom::End(0))?;
        log.file.write_all(b"\n")?;
        Ok(log)
    }

    /// Truncate or create the file at `path` and write a fresh header.
    pub(crate) fn create(path: PathBuf) -> Result<Self, StoreError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        let created = now();
        file.write_all(header(created).as_bytes())?;
        Ok(Self { path, file, created })
    }

    /// First line of the file, without its terminator.
    pub(crate) fn header_line(&mut self) -> io::Result<Option<String>> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut line = String::new();
        if BufReader::new(&self.file).read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn append(&mut self, line: &str) -> io::Result<()> {
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(line.as_bytes())?;
        self.file.flush()
    }

    pub(crate) fn size(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn read_records(&mut self) -> Result<Vec<LogRecord>, StoreError> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut records = Vec::new();
        for (index, line) in BufReader::new(&self.file)
            .lines()
            .enumerate()
            .skip(HEADER_LINES)
        {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = codec::decode(&line).map_err(|source| StoreError::Decode {
                line: index + 1,
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

pub(crate) fn header(created: NaiveDateTime) -> String {
    format!(
        "{} ({})\n\n\n",
        HEADER_TITLE,
        created.format(HEADER_DATE_FORMAT)
    )
}

/// Text between the parentheses of the header title line.
pub(crate) fn creation_token(header_line: &str) -> Option<&str> {
    let open = header_line.find('(')?;
    let close = header_line.rfind(')')?;
    (open < close).then(|| &header_line[open + 1..close])
}

fn parse_creation(header_line: &str) -> Option<NaiveDateTime> {
    let token = creation_token(header_line)?;
    NaiveDateTime::parse_from_str(token, HEADER_DATE_FORMAT).ok()
}

fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Directory the executable lives in, or the working directory when that
/// cannot be determined.
pub(crate) fn base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `requested` if it exists or can be created, otherwise the base directory.
pub(crate) fn resolve_log_dir(requested: &Path) -> PathBuf {
    match fs::create_dir_all(requested) {
        Ok(()) => requested.to_path_buf(),
        Err(e) => {
            let fallback = base_dir();
            warn!(
                "Cannot use log directory {}: {}. Falling back to {}",
                requested.display(),
                e,
                fallback.display()
            );
            fallback
        }
    }
}

/// Append-only record log shared by every thread of the process.
///
/// Configuration is read on every call, so `update_config` takes effect for
/// the next write without reopening the file.
pub struct LogStore {
    config: RwLock<LogConfig>,
    gate: AvailabilityGate<Option<LogFile>>,
}

impl LogStore {
    pub fn new(config: LogConfig) -> Self {
        Self {
            config: RwLock::new(config),
            gate: AvailabilityGate::new(None),
        }
    }

    pub fn config(&self) -> LogConfig {
        self.config.read().clone()
    }

    pub fn update_config(&self, config: LogConfig) {
        *self.config.write() = config;
    }

    pub fn is_initialized(&self) -> bool {
        self.gate.acquire().is_some()
    }

    /// Open `<directory>/AppLog.log`. Does nothing when logging is disabled
    /// or the store is already open.
    pub fn initialize(&self, directory: impl AsRef<Path>) -> Result<(), StoreError> {
        if !self.config.read().log_enabled {
            debug!("Logging disabled, not opening log file");
            return Ok(());
        }

        let mut slot = self.gate.acquire();
        if slot.is_some() {
            return Ok(());
        }

        let dir = resolve_log_dir(directory.as_ref());
        let log = LogFile::open(dir.join(LOG_FILE_NAME))?;
        info!("Log store opened at {}", log.path.display());
        *slot = Some(log);
        Ok(())
    }

    pub fn write(&self, record: &LogRecord) -> Result<WriteOutcome, StoreError> {
        let (enabled, threshold, max_size_mb, keep_old_logs) = {
            let config = self.config.read();
            (
                config.log_enabled,
                config.severity_threshold,
                config.max_size_mb,
                config.keep_old_logs,
            )
        };

        if !enabled {
            return Ok(WriteOutcome::Disabled);
        }
        if !threshold.admits(record.severity()) {
            debug!(
                "Dropping {} record below threshold {:?}",
                record.severity(),
                threshold
            );
            return Ok(WriteOutcome::Dropped);
        }

        let mut line = codec::encode(record);
        line.push('\n');

        let mut slot = self.gate.acquire();
        let log = slot.as_mut().ok_or(StoreError::NotInitialized)?;
        log.append(&line)?;

        let size = log.size()?;
        if rotation::needs_rotation(size, max_size_mb) {
            info!(
                "Log file reached {} bytes (cap {} MB), rotating",
                size, max_size_mb
            );
            rotation::rotate(&mut slot, keep_old_logs)?;
            return Ok(WriteOutcome::Rotated);
        }
        Ok(WriteOutcome::Appended)
    }

    /// Every record in the file, oldest first. A single malformed line fails
    /// the whole read.
    pub fn read_all(&self) -> Result<Vec<LogRecord>, StoreError> {
        let mut slot = self.gate.acquire();
        let log = slot.as_mut().ok_or(StoreError::NotInitialized)?;

        let records = log.read_records();
        log.file.seek(SeekFrom::End(0))?;
        records
    }

    /// Rotate regardless of size.
    pub fn clear(&self) -> Result<(), StoreError> {
        let keep_old_logs = self.config.read().keep_old_logs;
        let mut slot = self.gate.acquire();
        rotation::rotate(&mut slot, keep_old_logs)
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        self.gate.acquire().as_ref().map(|log| log.path.clone())
    }

    pub fn creation_timestamp(&self) -> Option<NaiveDateTime> {
        self.gate.acquire().as_ref().map(|log| log.created)
    }

    pub fn size_bytes(&self) -> Result<u64, StoreError> {
        let slot = self.gate.acquire();
        let log = slot.as_ref().ok_or(StoreError::NotInitialized)?;
        Ok(log.size()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::types::{Action, Severity, SeverityThreshold, Source};
    use tempfile::TempDir;

    fn create_test_store(config: LogConfig) -> (LogStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = LogStore::new(config);
        store.initialize(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn record(severity: Severity, text: &str) -> LogRecord {
        LogRecord::now(text, Source::Application, severity, Action::SettingsLoad)
    }

    #[test]
    fn test_new_file_gets_header() {
        let (store, temp) = create_test_store(LogConfig::default());
        let content = fs::read_to_string(temp.path().join(LOG_FILE_NAME)).unwrap();

        let lines: Vec<&str> = content.split('\n').collect();
        assert!(lines[0].starts_with("Application Log File ("));
        assert!(lines[0].ends_with(')'));
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "");
        assert_eq!(content, header(store.creation_timestamp().unwrap()));
    }

    #[test]
    fn test_initialize_twice_keeps_one_header() {
        let (store, temp) = create_test_store(LogConfig::default());
        store.initialize(temp.path()).unwrap();

        let content = fs::read_to_string(temp.path().join(LOG_FILE_NAME)).unwrap();
        assert_eq!(content.matches(HEADER_TITLE).count(), 1);
        assert_eq!(content.lines().count(), HEADER_LINES);
    }

    #[test]
    fn test_reopen_appends_separator_and_keeps_creation_date() {
        let temp = TempDir::new().unwrap();
        let created = {
            let store = LogStore::new(LogConfig::default());
            store.initialize(temp.path()).unwrap();
            store.write(&record(Severity::Warning, "first session")).unwrap();
            store.creation_timestamp().unwrap()
        };

        let store = LogStore::new(LogConfig::default());
        store.initialize(temp.path()).unwrap();
        store.write(&record(Severity::Error, "second session")).unwrap();

        assert_eq!(store.creation_timestamp(), Some(created));
        let content = fs::read_to_string(temp.path().join(LOG_FILE_NAME)).unwrap();
        assert!(content.contains("first session\n\n"));

        let texts: Vec<String> = store
            .read_all()
            .unwrap()
            .iter()
            .map(|r| r.text().to_string())
            .collect();
        assert_eq!(texts, ["first session", "second session"]);
    }

    #[test]
    fn test_three_byte_file_is_reset() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(LOG_FILE_NAME), [0xEF, 0xBB, 0xBF]).unwrap();

        let store = LogStore::new(LogConfig::default());
        store.initialize(temp.path()).unwrap();

        let content = fs::read_to_string(temp.path().join(LOG_FILE_NAME)).unwrap();
        assert!(content.starts_with(HEADER_TITLE));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_disabled_store_stays_closed() {
        let temp = TempDir::new().unwrap();
        let store = LogStore::new(LogConfig {
            log_enabled: false,
            ..Default::default()
        });
        store.initialize(temp.path()).unwrap();

        assert!(!store.is_initialized());
        assert!(!temp.path().join(LOG_FILE_NAME).exists());
        assert_eq!(
            store.write(&record(Severity::Error, "ignored")).unwrap(),
            WriteOutcome::Disabled
        );
    }

    #[test]
    fn test_write_before_initialize_fails() {
        let store = LogStore::new(LogConfig::default());
        let err = store.write(&record(Severity::Error, "too early")).unwrap_err();
        assert!(matches!(err, StoreError::NotInitialized));
        assert!(matches!(store.read_all(), Err(StoreError::NotInitialized)));
    }

    #[test]
    fn test_threshold_drops_records() {
        let (store, _temp) = create_test_store(LogConfig {
            severity_threshold: SeverityThreshold::Low,
            ..Default::default()
        });

        assert_eq!(
            store.write(&record(Severity::Information, "kept")).unwrap(),
            WriteOutcome::Appended
        );
        for severity in [
            Severity::Warning,
            Severity::Error,
            Severity::Critical,
            Severity::Debug,
        ] {
            assert_eq!(
                store.write(&record(severity, "dropped")).unwrap(),
                WriteOutcome::Dropped
            );
        }

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity(), Severity::Information);
    }

    #[test]
    fn test_update_config_applies_to_next_write() {
        let (store, _temp) = create_test_store(LogConfig::default());
        assert_eq!(
            store.write(&record(Severity::Error, "before")).unwrap(),
            WriteOutcome::Appended
        );

        store.update_config(LogConfig {
            severity_threshold: SeverityThreshold::None,
            ..store.config()
        });
        assert_eq!(
            store.write(&record(Severity::Information, "after")).unwrap(),
            WriteOutcome::Dropped
        );
    }

    #[test]
    fn test_read_all_round_trips() {
        let (store, _temp) = create_test_store(LogConfig::default());
        let written = vec![
            record(Severity::Information, "one"),
            record(Severity::Warning, "two"),
            record(Severity::Critical, "three"),
        ];
        for r in &written {
            store.write(r).unwrap();
        }

        assert_eq!(store.read_all().unwrap(), written);
        // Fresh sequence every call.
        assert_eq!(store.read_all().unwrap(), written);
    }

    #[test]
    fn test_malformed_line_aborts_read() {
        let (store, temp) = create_test_store(LogConfig::default());
        store.write(&record(Severity::Warning, "valid")).unwrap();

        let path = temp.path().join(LOG_FILE_NAME);
        let mut raw = OpenOptions::new().append(true).open(&path).unwrap();
        raw.write_all(b"this line has no fields\n").unwrap();
        drop(raw);

        match store.read_all() {
            Err(StoreError::Decode { line, source }) => {
                assert_eq!(line, 5);
                assert_eq!(source, ParseError::MissingField("timestamp"));
            }
            other => panic!("expected decode error, got {:?}", other.map(|r| r.len())),
        }

        // The failed read leaves the store writable.
        assert_eq!(
            store.write(&record(Severity::Warning, "after")).unwrap(),
            WriteOutcome::Appended
        );
    }

    #[test]
    fn test_unusable_directory_falls_back_to_base_dir() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();

        assert_eq!(resolve_log_dir(&blocker.join("logs")), base_dir());
        assert_eq!(resolve_log_dir(temp.path()), temp.path());
    }

    #[test]
    fn test_creation_token() {
        assert_eq!(
            creation_token("Application Log File (03-09-2024 14-27-05)"),
            Some("03-09-2024 14-27-05")
        );
        assert_eq!(creation_token("no parens"), None);
        assert_eq!(creation_token(") backwards ("), None);
    }
}
