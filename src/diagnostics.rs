//! File sink for the crate's log records.
//!
//! Records are appended as
//!
//! ```text
//! -- [18/Oct/2026 14:03:59] Request: GET / HTTP/1.0
//!
//! ```
//!
//! Any other [`log`] implementation works just as well, this one is only a
//! convenience for processes that have none.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Local};
use log::{LevelFilter, Log, Metadata, Record};

use crate::Error;

/// Log file used when nothing else is said.
pub const DEFAULT_LOG_FILE: &str = "selfhost.log";

/// [`Log`] appending every record to a file.
#[derive(Debug)]
pub struct FileLog {
    file: Mutex<File>,
    level: LevelFilter,
}

impl FileLog {
    /// Open, or create, the file for appending.
    pub fn open(path: impl AsRef<Path>, level: LevelFilter) -> Result<Self, Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(FileLog {
            file: Mutex::new(file),
            level,
        })
    }
}

impl Log for FileLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = format_entry(Local::now(), record.args());

        // A poisoned lock means a writer panicked, drop the record.
        let Ok(mut file) = self.file.lock() else {
            return;
        };

        let _ = file.write_all(entry.as_bytes());
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

fn format_entry(now: DateTime<Local>, message: &fmt::Arguments<'_>) -> String {
    format!("-- [{}] {}\n\n", now.format("%d/%b/%Y %H:%M:%S"), message)
}

/// Install a [`FileLog`] as the global logger.
///
/// Fails if the file can't be opened or a logger is already installed.
pub fn init(path: impl AsRef<Path>, level: LevelFilter) -> Result<(), Error> {
    let log = FileLog::open(path, level)?;

    log::set_boxed_logger(Box::new(log)).map_err(|e| Error::Init(e.to_string()))?;
    log::set_max_level(level);

    Ok(())
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::path::PathBuf;

    use chrono::TimeZone;
    use log::Level;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("selfhost-{}-{}.log", std::process::id(), name));
        let _ = fs::remove_file(&p);
        p
    }

    #[test]
    fn entry_format() {
        let now = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        let entry = format_entry(now, &format_args!("initializing server"));
        assert_eq!(entry, "-- [07/Mar/2024 09:05:02] initializing server\n\n");
    }

    #[test]
    fn appends_enabled_records() -> Result<(), Error> {
        let path = temp_path("appends");
        let log = FileLog::open(&path, LevelFilter::Info)?;

        log.log(
            &Record::builder()
                .args(format_args!("first"))
                .level(Level::Error)
                .build(),
        );
        log.log(
            &Record::builder()
                .args(format_args!("too chatty"))
                .level(Level::Debug)
                .build(),
        );
        log.log(
            &Record::builder()
                .args(format_args!("second"))
                .level(Level::Info)
                .build(),
        );
        log.flush();

        let content = fs::read_to_string(&path)?;
        let entries: Vec<_> = content.split("\n\n").filter(|e| !e.is_empty()).collect();

        assert_eq!(entries.len(), 2);
        assert!(entries[0].starts_with("-- ["));
        assert!(entries[0].ends_with("] first"));
        assert!(entries[1].ends_with("] second"));

        fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn reopen_appends() -> Result<(), Error> {
        let path = temp_path("reopen");

        for msg in ["one", "two"] {
            let log = FileLog::open(&path, LevelFilter::Trace)?;
            log.log(
                &Record::builder()
                    .args(format_args!("{}", msg))
                    .level(Level::Trace)
                    .build(),
            );
        }

        let content = fs::read_to_string(&path)?;
        assert!(content.contains("] one\n\n-- ["));
        assert!(content.ends_with("] two\n\n"));

        fs::remove_file(&path)?;
        Ok(())
    }
}
