//! shutguard Journal — the per-run decision log.
//!
//! A [`journal::Journal`] is created once per invocation and handed to every
//! component that makes or executes a decision. Each record is kept in
//! memory, mirrored to `tracing`, and appended straight away to the attached
//! [`sink::JournalSink`]s, so the line explaining a power-off reaches disk
//! before the power-off command runs.

pub mod journal;
pub mod sink;

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use journal::Journal;
pub use sink::{FileSink, JournalSink, SinkError};

// ── Core Types ───────────────────────────────────────────────────

/// Unique identifier for one guard invocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of a journal entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// One timestamped line of the journal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    /// Local wall-clock time the entry was recorded.
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
}

impl JournalEntry {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            severity,
            message: message.into(),
        }
    }

    /// Render as `YYYY-MM-DD HH:MM:SS,mmm - LEVEL - message`.
    pub fn render_line(&self) -> String {
        format!(
            "{} - {} - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S,%3f"),
            self.severity,
            self.message
        )
    }
}

/// Everything a run wrote to its journal, closed off at the end of the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalRecord {
    pub run_id: RunId,
    pub entries: Vec<JournalEntry>,
    pub started_at: DateTime<Local>,
    pub completed_at: DateTime<Local>,
}

impl JournalRecord {
    /// Number of entries with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    #[test]
    fn render_line_layout() {
        let timestamp = Local
            .with_ymd_and_hms(2024, 7, 15, 14, 30, 5)
            .earliest()
            .unwrap()
            + TimeDelta::try_milliseconds(42).unwrap();
        let entry = JournalEntry {
            timestamp,
            severity: Severity::Error,
            message: "Network activity check failed: boom".to_string(),
        };

        assert_eq!(
            entry.render_line(),
            "2024-07-15 14:30:05,042 - ERROR - Network activity check failed: boom"
        );
    }

    #[test]
    fn severity_serializes_uppercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
    }
}
