//! Per-document metadata pairs
//!
//! A [`MetadataPairSet`] is reserved at a fixed capacity. Its entries are
//! slots: every slot is written by index before the set is handed to an
//! engine. There is no append operation. Reading an unwritten
//! slot is an error rather than a zero value, and [`MetadataPairSet::pairs`]
//! refuses to expose a partially written set.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Misuse of a [`MetadataPairSet`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// Index past the reserved capacity
    #[error("metadata slot {index} out of range for capacity {capacity}")]
    SlotOutOfRange {
        /// Requested slot
        index: usize,
        /// Reserved capacity
        capacity: usize,
    },

    /// Slot was never written
    #[error("metadata slot {index} was never written")]
    UnwrittenSlot {
        /// First unwritten slot
        index: usize,
    },
}

/// One metadata key with a raw byte value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataPair {
    /// Metadata field name
    pub key: String,
    /// Raw value bytes
    pub value: Vec<u8>,
}

impl MetadataPair {
    /// Create a pair
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        MetadataPair {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Value as UTF-8 text, if it is valid UTF-8
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }
}

/// Fixed-capacity set of metadata slots
///
/// ```
/// use docket_core::{MetadataPair, MetadataPairSet};
///
/// let mut set = MetadataPairSet::with_capacity(2);
/// assert_eq!(set.len(), 2);
/// assert!(set.pairs().is_err());
///
/// set.set(0, MetadataPair::new("docno", "00111")).unwrap();
/// set.set(1, MetadataPair::new("kind", "blog1")).unwrap();
/// assert_eq!(set.pairs().unwrap()[1].key, "kind");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataPairSet {
    slots: Vec<Option<MetadataPair>>,
}

impl MetadataPairSet {
    /// Reserve `capacity` unwritten slots
    pub fn with_capacity(capacity: usize) -> Self {
        MetadataPairSet {
            slots: vec![None; capacity],
        }
    }

    /// Build a fully written set
    pub fn from_pairs(pairs: impl IntoIterator<Item = MetadataPair>) -> Self {
        MetadataPairSet {
            slots: pairs.into_iter().map(Some).collect(),
        }
    }

    /// Logical size, always the reserved capacity
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the capacity is zero
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Write slot `index`
    pub fn set(&mut self, index: usize, pair: MetadataPair) -> Result<(), MetadataError> {
        let capacity = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(MetadataError::SlotOutOfRange { index, capacity })?;
        *slot = Some(pair);
        Ok(())
    }

    /// Read slot `index`
    pub fn get(&self, index: usize) -> Result<&MetadataPair, MetadataError> {
        match self.slots.get(index) {
            Some(Some(pair)) => Ok(pair),
            Some(None) => Err(MetadataError::UnwrittenSlot { index }),
            None => Err(MetadataError::SlotOutOfRange {
                index,
                capacity: self.slots.len(),
            }),
        }
    }

    /// True once every slot has been written
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// All pairs in slot order, or the first unwritten slot
    pub fn pairs(&self) -> Result<Vec<MetadataPair>, MetadataError> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| slot.clone().ok_or(MetadataError::UnwrittenSlot { index }))
            .collect()
    }
}
