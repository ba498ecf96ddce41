//! File-backed journal implementation.
//!
//! Entries are stored as one JSON object per line across three files:
//! `combined.log` receives everything, `error.log` receives error-level
//! entries, and `emails.log` receives email activity.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use clap::Parser;

use crate::domain::journal::{
    EntryCategory, Journal, JournalEntry, JournalError, LogLevel, LogStream,
};

/// Journal storage configuration
#[derive(Clone, Default, Debug, Parser)]
pub struct JournalConfig {
    /// The directory journal files are written to
    #[clap(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: String,
}

#[derive(Debug)]
struct JournalFiles {
    dir: PathBuf,
    combined: Mutex<File>,
    error: Mutex<File>,
    emails: Mutex<File>,
}

/// File-backed journal
#[derive(Clone, Debug)]
pub struct FileJournal {
    files: Arc<JournalFiles>,
}

impl FileJournal {
    /// Create a new file journal, creating the log directory and files as
    /// needed.
    pub fn new(config: &JournalConfig) -> Result<Self> {
        let dir = PathBuf::from(&config.log_dir);

        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;

        Ok(Self {
            files: Arc::new(JournalFiles {
                combined: Mutex::new(open_append(&dir.join("combined.log"))?),
                error: Mutex::new(open_append(&dir.join("error.log"))?),
                emails: Mutex::new(open_append(&dir.join("emails.log"))?),
                dir,
            }),
        })
    }

    fn stream_path(&self, stream: LogStream) -> PathBuf {
        let name = match stream {
            LogStream::Emails => "emails.log",
            LogStream::Error => "error.log",
            LogStream::Combined => "combined.log",
        };

        self.files.dir.join(name)
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open journal file {}", path.display()))
}

fn append_line(file: &Mutex<File>, line: &str) {
    match file.lock() {
        Ok(mut file) => {
            if let Err(err) = writeln!(file, "{line}") {
                tracing::warn!(error = %err, "Failed to append journal entry");
            }
        }
        Err(_) => tracing::warn!("Journal file lock poisoned"),
    }
}

impl Journal for FileJournal {
    fn append(&self, entry: JournalEntry) {
        let line = match serde_json::to_string(&entry) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to serialize journal entry");
                return;
            }
        };

        append_line(&self.files.combined, &line);

        if entry.level == LogLevel::Error {
            append_line(&self.files.error, &line);
        }

        if entry.category == EntryCategory::Email {
            append_line(&self.files.emails, &line);
        }
    }

    fn recent(&self, stream: LogStream, limit: usize) -> Result<Vec<JournalEntry>, JournalError> {
        let path = self.stream_path(stream);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(JournalError::ReadError(err.into())),
        };

        let entries: Vec<JournalEntry> = content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        let skip = entries.len().saturating_sub(limit);

        Ok(entries.into_iter().skip(skip).rev().collect())
    }
}
