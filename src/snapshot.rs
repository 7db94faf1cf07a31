//! Merged snapshot over several shard snapshots.
//!
//! Shards are consumed newest first: the most recently flushed shard is
//! expected to hold the freshest data. Each shard snapshot is dropped as soon
//! as it is found exhausted and is never revisited.

use bytes::Bytes;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::cursor::Cursor;
use crate::shard::ShardSnapshotRef;

/// Shared handle to a [`ShardSnapshotMerger`].
pub type SharedMerger = Arc<Mutex<ShardSnapshotMerger>>;

/// A single cursor over an ordered set of shard snapshots.
///
/// The snapshots are kept as a stack: the last element is the current one.
/// Either the stack is empty or, after [`valid`](Cursor::valid), its last
/// element is positioned on a record.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use tailcursor::shard::{MemShard, Shard, ShardRecord};
/// use tailcursor::{Cursor, ShardSnapshotMerger};
///
/// let older = MemShard::new(vec![ShardRecord::new("k1", vec![Bytes::from("v1")], 1)]);
/// let newer = MemShard::new(vec![ShardRecord::new("k2", vec![Bytes::from("v2")], 5)]);
///
/// let mut snapshot = ShardSnapshotMerger::new(vec![older.snapshot(), newer.snapshot()]);
///
/// let mut keys = Vec::new();
/// while snapshot.valid() {
///     keys.push(snapshot.key());
///     snapshot.next();
/// }
/// assert_eq!(keys, vec![Bytes::from("k2"), Bytes::from("k1")]);
/// ```
pub struct ShardSnapshotMerger {
    /// Oldest shard first; the last element is the current one
    snaps: Vec<ShardSnapshotRef>,
}

impl ShardSnapshotMerger {
    /// Creates a merger over the given shard snapshots, oldest shard first.
    pub fn new(snaps: Vec<ShardSnapshotRef>) -> Self {
        Self { snaps }
    }

    /// Wraps the merger in a shared handle.
    pub fn into_shared(self) -> SharedMerger {
        Arc::new(Mutex::new(self))
    }

    /// Returns the number of shard snapshots not yet dropped.
    pub fn remaining(&self) -> usize {
        self.snaps.len()
    }

    /// Hash of the current key in primary hash space, or `0`.
    pub fn primary_hash(&self) -> u32 {
        self.snaps.last().map_or(0, |snap| snap.lock().primary_hash())
    }

    /// Hash of the current record in secondary hash space, or `0`.
    pub fn secondary_hash(&self) -> u32 {
        self.snaps.last().map_or(0, |snap| snap.lock().secondary_hash())
    }
}

impl Cursor for ShardSnapshotMerger {
    fn valid(&mut self) -> bool {
        while let Some(snap) = self.snaps.last() {
            if snap.lock().valid() {
                return true;
            }

            self.snaps.pop();
            log::debug!("Shard snapshot exhausted, {} remaining", self.snaps.len());
        }

        false
    }

    fn next(&mut self) {
        if let Some(snap) = self.snaps.last() {
            snap.lock().next();
        }
    }

    /// Every shard position is a primary record.
    fn has_value(&self) -> bool {
        !self.snaps.is_empty()
    }

    fn version(&self) -> u64 {
        self.snaps.last().map_or(0, |snap| snap.lock().version())
    }

    fn key(&self) -> Bytes {
        self.snaps.last().map(|snap| snap.lock().key()).unwrap_or_default()
    }

    fn value(&self) -> Vec<Bytes> {
        self.snaps.last().map(|snap| snap.lock().value()).unwrap_or_default()
    }
}

impl fmt::Debug for ShardSnapshotMerger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardSnapshotMerger")
            .field("remaining", &self.snaps.len())
            .finish()
    }
}
