//! Document journal
//!
//! One JSON object per line records every document add and delete. A line
//! is durable once its trailing newline is on disk; a final line without a
//! newline is a torn write from a crash and is reported for truncation.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use docket_core::{DocumentId, MetadataPair};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalRecord {
    /// A document was added
    Add {
        /// Assigned identifier
        id: DocumentId,
        /// Document class used to parse it
        class: String,
        /// Source file, `None` for in-memory documents
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        /// Attached metadata
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        metadata: Vec<MetadataPair>,
        /// Whether the content was kept under `docs/`
        stored: bool,
    },
    /// A document was deleted
    Delete {
        /// Deleted identifier
        id: DocumentId,
    },
}

/// Errors reading or writing the journal
#[derive(Debug, Error)]
pub enum JournalError {
    /// I/O error
    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A complete line failed to decode
    #[error("journal line {line} is corrupt: {message}")]
    Corrupt {
        /// 1-based line number
        line: usize,
        /// Decoder message
        message: String,
    },

    /// Records contradict each other
    #[error("journal line {line} is inconsistent: {message}")]
    Inconsistent {
        /// 1-based line number
        line: usize,
        /// What contradicts
        message: String,
    },

    /// A record could not be encoded
    #[error("cannot encode journal record: {0}")]
    Encode(String),
}

/// Result of reading a journal file
#[derive(Debug, Default)]
pub struct JournalReplay {
    /// Every complete record in order
    pub records: Vec<JournalRecord>,
    /// Byte offset where complete records end
    pub valid_end: u64,
    /// File size when read
    pub original_size: u64,
}

impl JournalReplay {
    /// True when the file ends in a torn line
    pub fn has_torn_tail(&self) -> bool {
        self.valid_end < self.original_size
    }
}

/// Read all complete records; a missing file reads as empty
pub fn read_journal(path: &Path) -> Result<JournalReplay, JournalError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(JournalReplay::default()),
        Err(e) => return Err(e.into()),
    };

    let mut replay = JournalReplay {
        original_size: bytes.len() as u64,
        ..Default::default()
    };

    let mut offset = 0usize;
    let mut line_no = 0usize;
    while let Some(len) = bytes[offset..].iter().position(|&b| b == b'\n') {
        line_no += 1;
        let line = &bytes[offset..offset + len];
        offset += len + 1;
        if line.iter().all(u8::is_ascii_whitespace) {
            replay.valid_end = offset as u64;
            continue;
        }
        let record = serde_json::from_slice(line).map_err(|e| JournalError::Corrupt {
            line: line_no,
            message: e.to_string(),
        })?;
        replay.records.push(record);
        replay.valid_end = offset as u64;
    }

    Ok(replay)
}

/// Append handle on the journal file
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    file: File,
}

impl Journal {
    /// Create an empty journal, replacing any existing file
    pub fn create(path: PathBuf) -> Result<Self, JournalError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        file.sync_all()?;
        Self::open(path)
    }

    /// Open for appending
    pub fn open(path: PathBuf) -> Result<Self, JournalError> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Journal { path, file })
    }

    /// Cut the file back to `valid_end`, dropping a torn final line
    pub fn truncate_to(path: &Path, valid_end: u64) -> Result<(), JournalError> {
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(valid_end)?;
        file.sync_all()?;
        Ok(())
    }

    /// Append one record durably
    pub fn append(&mut self, record: &JournalRecord) -> Result<(), JournalError> {
        let mut line =
            serde_json::to_vec(record).map_err(|e| JournalError::Encode(e.to_string()))?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Flush file contents and metadata
    pub fn sync(&self) -> Result<(), JournalError> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Journal path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
