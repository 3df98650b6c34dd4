//! Repository manifest format
//!
//! The manifest is the marker whose presence means a repository finished
//! initializing. It is written last during creation and carries only
//! identity information.
//!
//! # Format
//!
//! ```text
//! +--------------------+
//! | Magic: "DKTM"      | 4 bytes
//! | Format Version     | 4 bytes (u32 LE)
//! | Repository UUID    | 16 bytes
//! | Created At (ms)    | 8 bytes (u64 LE)
//! | CRC32              | 4 bytes
//! +--------------------+
//! ```

use std::path::{Path, PathBuf};

use super::write_atomic;

/// Manifest magic bytes: "DKTM" (0x444B544D)
pub const MANIFEST_MAGIC: [u8; 4] = *b"DKTM";

/// Current manifest format version
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

/// Encoded manifest size in bytes
pub const MANIFEST_SIZE: usize = 36;

/// Manifest contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Format version for forward compatibility
    pub format_version: u32,
    /// Unique repository identifier (generated on creation)
    pub repository_uuid: [u8; 16],
    /// Creation time, milliseconds since the Unix epoch
    pub created_at_millis: u64,
}

impl Manifest {
    /// Create a manifest for a fresh repository
    pub fn new(repository_uuid: [u8; 16]) -> Self {
        let created_at_millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        Manifest {
            format_version: MANIFEST_FORMAT_VERSION,
            repository_uuid,
            created_at_millis,
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(MANIFEST_SIZE);

        bytes.extend_from_slice(&MANIFEST_MAGIC);
        bytes.extend_from_slice(&self.format_version.to_le_bytes());
        bytes.extend_from_slice(&self.repository_uuid);
        bytes.extend_from_slice(&self.created_at_millis.to_le_bytes());

        // CRC32 of all preceding bytes
        let crc = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());

        bytes
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ManifestError> {
        if bytes.len() < MANIFEST_SIZE {
            return Err(ManifestError::TooShort);
        }
        if bytes[0..4] != MANIFEST_MAGIC {
            return Err(ManifestError::InvalidMagic);
        }

        let data = &bytes[..MANIFEST_SIZE - 4];
        let stored_crc = read_u32(bytes, MANIFEST_SIZE - 4);
        let computed_crc = crc32fast::hash(data);
        if stored_crc != computed_crc {
            return Err(ManifestError::ChecksumMismatch {
                expected: stored_crc,
                computed: computed_crc,
            });
        }

        let format_version = read_u32(bytes, 4);
        if format_version > MANIFEST_FORMAT_VERSION {
            return Err(ManifestError::UnsupportedVersion(format_version));
        }

        let mut repository_uuid = [0u8; 16];
        repository_uuid.copy_from_slice(&bytes[8..24]);
        let created_at_millis = read_u64(bytes, 24);

        Ok(Manifest {
            format_version,
            repository_uuid,
            created_at_millis,
        })
    }

    /// Repository UUID in hyphenated form
    pub fn uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.repository_uuid).to_string()
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

/// Manifest persistence manager
///
/// Handles atomic persistence using the write-fsync-rename pattern.
#[derive(Debug)]
pub struct ManifestManager {
    path: PathBuf,
    manifest: Manifest,
}

impl ManifestManager {
    /// Write a manifest with a freshly generated UUID
    pub fn create(path: PathBuf) -> Result<Self, ManifestError> {
        let manifest = Manifest::new(*uuid::Uuid::new_v4().as_bytes());
        let manager = ManifestManager { path, manifest };
        manager.persist()?;
        Ok(manager)
    }

    /// Load an existing manifest
    pub fn load(path: PathBuf) -> Result<Self, ManifestError> {
        let bytes = std::fs::read(&path)?;
        let manifest = Manifest::from_bytes(&bytes)?;
        Ok(ManifestManager { path, manifest })
    }

    /// Check if a manifest exists at the given path
    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }

    /// Persist atomically
    pub fn persist(&self) -> Result<(), ManifestError> {
        write_atomic(&self.path, &self.manifest.to_bytes())?;
        Ok(())
    }

    /// Manifest path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current manifest
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

/// Errors that can occur with manifest operations
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Manifest file too short
    #[error("manifest too short")]
    TooShort,

    /// Invalid magic bytes
    #[error("invalid magic bytes")]
    InvalidMagic,

    /// Written by a newer format
    #[error("unsupported manifest version {0}")]
    UnsupportedVersion(u32),

    /// Checksum mismatch
    #[error("checksum mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch {
        /// Expected CRC32 value (from file)
        expected: u32,
        /// Computed CRC32 value
        computed: u32,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ManifestError {
    /// True when the file content failed validation (as opposed to I/O)
    pub fn is_corruption(&self) -> bool {
        !matches!(self, ManifestError::Io(_))
    }
}
