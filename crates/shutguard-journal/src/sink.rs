//! Journal sinks — trait + append-only file implementation.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::JournalEntry;

/// Errors that can occur while writing journal entries.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Cannot open journal file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for rendered journal entries.
pub trait JournalSink: Send {
    /// Persist one entry. Called once per entry, in recording order.
    fn append(&self, entry: &JournalEntry) -> Result<(), SinkError>;

    /// Short human-readable description, used in diagnostics.
    fn describe(&self) -> String;
}

/// Appends one rendered line per entry to a text file.
///
/// The file is created if missing; its parent directory must exist.
/// Existing content is never truncated and nothing is rotated.
pub struct FileSink {
    path: PathBuf,
    file: File,
}

impl FileSink {
    /// Open `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JournalSink for FileSink {
    fn append(&self, entry: &JournalEntry) -> Result<(), SinkError> {
        let mut file = &self.file;
        writeln!(file, "{}", entry.render_line())?;
        file.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
