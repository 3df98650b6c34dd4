//! On-disk formats for the repository manifest and document journal.
//!
//! # Module Structure
//!
//! - `manifest`: binary manifest marker with CRC32
//! - `journal`: JSON-lines log of document adds and deletes

pub mod journal;
pub mod manifest;

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

pub use journal::{read_journal, Journal, JournalError, JournalRecord, JournalReplay};
pub use manifest::{
    Manifest, ManifestError, ManifestManager, MANIFEST_FORMAT_VERSION, MANIFEST_MAGIC,
};

/// Replace `path` atomically (write-fsync-rename)
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let temp_path = path.with_extension("tmp");

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&temp_path, path)?;

    if let Some(parent) = path.parent() {
        if parent.exists() {
            File::open(parent)?.sync_all()?;
        }
    }
    Ok(())
}
