//! Log record format.
//!
//! Each record carries:
//! - Coordinate: placement metadata (primary hash, secondary hash, mask)
//! - Version: per-key recency counter
//! - Key: raw key bytes
//! - Value: ordered sequence of value fields

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Placement metadata attached to every log record.
///
/// A record whose `secondary_mask` equals [`Coordinate::PRIMARY_MASK`] is a
/// primary key/value record. Any other mask marks secondary-index
/// maintenance that readers reconstructing key/value pairs must skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// Hash of the key in primary hash space.
    pub primary_hash: u32,
    /// Hash in secondary hash space.
    pub secondary_hash: u32,
    /// Secondary mask; all-ones for primary records.
    pub secondary_mask: u32,
}

impl Coordinate {
    /// Mask value identifying a primary record.
    pub const PRIMARY_MASK: u32 = u32::MAX;

    /// Creates the coordinate of a primary record.
    pub fn primary(primary_hash: u32, secondary_hash: u32) -> Self {
        Self {
            primary_hash,
            secondary_hash,
            secondary_mask: Self::PRIMARY_MASK,
        }
    }

    /// Creates the coordinate of a secondary-index record.
    pub fn secondary(primary_hash: u32, secondary_hash: u32, secondary_mask: u32) -> Self {
        Self {
            primary_hash,
            secondary_hash,
            secondary_mask,
        }
    }

    /// Returns true if this coordinate marks a primary record.
    pub fn is_primary(&self) -> bool {
        self.secondary_mask == Self::PRIMARY_MASK
    }
}

/// One record appended to the log.
///
/// Records are immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Placement metadata
    pub coordinate: Coordinate,
    /// Recency counter for the key
    pub version: u64,
    /// Key bytes
    pub key: Bytes,
    /// Value fields
    pub value: Vec<Bytes>,
}

impl LogEntry {
    /// Creates a new log record.
    pub fn new(
        coordinate: Coordinate,
        version: u64,
        key: impl Into<Bytes>,
        value: Vec<Bytes>,
    ) -> Self {
        Self {
            coordinate,
            version,
            key: key.into(),
            value,
        }
    }

    /// Returns true if this is a primary key/value record.
    pub fn is_primary(&self) -> bool {
        self.coordinate.is_primary()
    }
}
