//! Incremental journal recorder for a single guard run.
//!
//! ```no_run
//! # use shutguard_journal::{FileSink, Journal, Severity};
//! let mut journal = Journal::new();
//! journal.attach(FileSink::open("/var/log/auto_shutdown.log").unwrap());
//! journal.info("Outside shutdown window. Skipping execution.");
//! let record = journal.finalize();
//! assert_eq!(record.count(Severity::Info), 1);
//! ```

use chrono::{DateTime, Local};

use crate::sink::JournalSink;
use crate::{JournalEntry, JournalRecord, RunId, Severity};

/// Records what a run decided and did, in order.
pub struct Journal {
    run_id: RunId,
    started_at: DateTime<Local>,
    entries: Vec<JournalEntry>,
    sinks: Vec<Box<dyn JournalSink>>,
}

impl Journal {
    /// Start a journal with no sinks attached; entries stay in memory only.
    pub fn new() -> Self {
        Self {
            run_id: RunId::new(),
            started_at: Local::now(),
            entries: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// Attach a sink. Only entries recorded afterwards are written to it.
    pub fn attach(&mut self, sink: impl JournalSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Severity::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(Severity::Error, message);
    }

    /// Record an entry: keep it, mirror it to tracing, append it to every sink.
    ///
    /// A sink that fails to write is reported through tracing and otherwise
    /// ignored; journaling never changes the outcome of a run.
    pub fn record(&mut self, severity: Severity, message: impl Into<String>) {
        let entry = JournalEntry::new(severity, message);

        match severity {
            Severity::Info => tracing::info!(run_id = %self.run_id, "{}", entry.message),
            Severity::Warning => tracing::warn!(run_id = %self.run_id, "{}", entry.message),
            Severity::Error => tracing::error!(run_id = %self.run_id, "{}", entry.message),
        }

        for sink in &self.sinks {
            if let Err(e) = sink.append(&entry) {
                tracing::warn!(
                    run_id = %self.run_id,
                    sink = %sink.describe(),
                    error = %e,
                    "Failed to append journal entry"
                );
            }
        }

        self.entries.push(entry);
    }

    /// Close the journal and hand back everything it recorded.
    pub fn finalize(self) -> JournalRecord {
        JournalRecord {
            run_id: self.run_id,
            entries: self.entries,
            started_at: self.started_at,
            completed_at: Local::now(),
        }
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}
