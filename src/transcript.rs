use chrono::{DateTime, Local};
use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::model::HistoryEntry;

const DEFAULT_TRANSCRIPT_PATH: &str = "chat_history.log";

/// Receives every entry appended to the conversation history.
pub trait Transcript {
    fn record(&self, entry: &HistoryEntry, at: DateTime<Local>) -> io::Result<()>;
}

/// Appends one line per entry to a flat text file.
#[derive(Debug, Clone)]
pub struct FileTranscript {
    path: PathBuf,
}

impl FileTranscript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transcript for FileTranscript {
    fn record(&self, entry: &HistoryEntry, at: DateTime<Local>) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format_line(entry, at).as_bytes())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranscript;

impl Transcript for NoTranscript {
    fn record(&self, _entry: &HistoryEntry, _at: DateTime<Local>) -> io::Result<()> {
        Ok(())
    }
}

pub fn format_line(entry: &HistoryEntry, at: DateTime<Local>) -> String {
    format!(
        "[{}] {}: {}\n",
        at.format("%Y-%m-%d %H:%M:%S"),
        entry.role.label(),
        entry.text
    )
}

pub fn transcript_path() -> PathBuf {
    transcript_path_with(|key| env::var(key).ok())
}

fn transcript_path_with(mut get_var: impl FnMut(&str) -> Option<String>) -> PathBuf {
    get_var("TRANSCRIPT_PATH")
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TRANSCRIPT_PATH))
}
