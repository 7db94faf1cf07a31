//! In-memory shard.
//!
//! Holds its records in an immutable, reference-counted slice, so snapshots
//! are just a position over shared data.

use super::{shared, Shard, ShardSnapshot, ShardSnapshotRef};
use bytes::Bytes;
use std::sync::Arc;

/// A single record stored in a shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardRecord {
    /// Hash of the key in primary hash space
    pub primary_hash: u32,
    /// Hash in secondary hash space
    pub secondary_hash: u32,
    /// Recency counter for the key
    pub version: u64,
    /// Key bytes
    pub key: Bytes,
    /// Value fields
    pub value: Vec<Bytes>,
}

impl ShardRecord {
    /// Creates a record with zero hashes.
    pub fn new(key: impl Into<Bytes>, value: Vec<Bytes>, version: u64) -> Self {
        Self {
            primary_hash: 0,
            secondary_hash: 0,
            version,
            key: key.into(),
            value,
        }
    }

    /// Sets the placement hashes.
    pub fn with_hashes(mut self, primary_hash: u32, secondary_hash: u32) -> Self {
        self.primary_hash = primary_hash;
        self.secondary_hash = secondary_hash;
        self
    }
}

/// An immutable shard held in memory.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use tailcursor::shard::{MemShard, Shard, ShardRecord};
///
/// let shard = MemShard::new(vec![ShardRecord::new("k1", vec![Bytes::from("v1")], 1)]);
/// let snapshot = shard.snapshot();
/// assert!(snapshot.lock().valid());
/// ```
#[derive(Debug, Clone)]
pub struct MemShard {
    records: Arc<[ShardRecord]>,
}

impl MemShard {
    /// Creates a shard from records in iteration order.
    pub fn new(records: Vec<ShardRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the shard holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Shard for MemShard {
    fn snapshot(&self) -> ShardSnapshotRef {
        shared(MemShardSnapshot::new(Arc::clone(&self.records)))
    }
}

/// Cursor over a [`MemShard`]'s records.
#[derive(Debug, Clone)]
pub struct MemShardSnapshot {
    records: Arc<[ShardRecord]>,
    position: usize,
}

impl MemShardSnapshot {
    /// Creates a snapshot positioned at the first record.
    pub fn new(records: Arc<[ShardRecord]>) -> Self {
        Self {
            records,
            position: 0,
        }
    }

    fn current(&self) -> Option<&ShardRecord> {
        self.records.get(self.position)
    }
}

impl ShardSnapshot for MemShardSnapshot {
    fn valid(&mut self) -> bool {
        self.position < self.records.len()
    }

    fn next(&mut self) {
        if self.position < self.records.len() {
            self.position += 1;
        }
    }

    fn primary_hash(&self) -> u32 {
        self.current().map_or(0, |r| r.primary_hash)
    }

    fn secondary_hash(&self) -> u32 {
        self.current().map_or(0, |r| r.secondary_hash)
    }

    fn version(&self) -> u64 {
        self.current().map_or(0, |r| r.version)
    }

    fn key(&self) -> Bytes {
        self.current().map(|r| r.key.clone()).unwrap_or_default()
    }

    fn value(&self) -> Vec<Bytes> {
        self.current().map(|r| r.value.clone()).unwrap_or_default()
    }
}
