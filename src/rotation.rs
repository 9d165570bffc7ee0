//! Size-capped rotation of the log file.
//!
//! Runs only while the caller holds the store gate and never acquires it.

use crate::error::StoreError;
use crate::log_store::{creation_token, LogFile, HEADER_DATE_FORMAT};
use log::info;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const BYTES_PER_MB: u64 = 1_048_576;
pub const ARCHIVE_DIR_NAME: &str = "Old logs";

/// Whole megabytes only: a 1 MB cap trips once the file reaches 1 MiB.
pub fn needs_rotation(size_bytes: u64, max_size_mb: u64) -> bool {
    size_bytes / BYTES_PER_MB >= max_size_mb
}

/// Archive (optionally), delete and recreate the log file held in `slot`.
///
/// If archiving or deleting fails the current file stays in the slot. If the
/// file cannot be recreated the slot is left empty and the store needs
/// `initialize` again.
pub(crate) fn rotate(slot: &mut Option<LogFile>, keep_old_logs: bool) -> Result<(), StoreError> {
    let mut current = slot.take().ok_or(StoreError::NotInitialized)?;

    if keep_old_logs {
        match archive(&mut current) {
            Ok(archive_path) => info!("Archived log to {}", archive_path.display()),
            Err(e) => {
                *slot = Some(current);
                return Err(e.into());
            }
        }
    }

    if let Err(e) = fs::remove_file(&current.path) {
        *slot = Some(current);
        return Err(e.into());
    }
    let path = current.path.clone();
    drop(current);

    let fresh = LogFile::create(path)?;
    info!("Log file rotated, new header dated {}", fresh.created);
    *slot = Some(fresh);
    Ok(())
}

/// Copy the whole file, header included, to `Old logs/<creation date>log`
/// next to it. The name is the raw header token; an existing archive is
/// never overwritten.
fn archive(current: &mut LogFile) -> io::Result<PathBuf> {
    let token = match current.header_line()? {
        Some(line) => creation_token(&line).map(str::to_string),
        None => None,
    }
    .unwrap_or_else(|| current.created.format(HEADER_DATE_FORMAT).to_string());

    let dir = current
        .path
        .parent()
        .map(|p| p.join(ARCHIVE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(ARCHIVE_DIR_NAME));
    fs::create_dir_all(&dir)?;

    let (mut out, archive_path) = create_archive(&dir, &token)?;
    current.file.seek(SeekFrom::Start(0))?;
    io::copy(&mut current.file, &mut out)?;
    out.flush()?;
    out.sync_all()?;

    Ok(archive_path)
}

/// `<token>log`, or `<token> (N)log` with the first free N >= 2.
fn create_archive(dir: &Path, token: &str) -> io::Result<(File, PathBuf)> {
    for n in 1u32.. {
        let name = if n == 1 {
            format!("{}log", token)
        } else {
            format!("{} ({})log", token, n)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(ErrorKind::AlreadyExists, "no free archive name"))
}
