//! Shard snapshot collaborators.
//!
//! A shard is an immutable partition of the key space flushed at some point.
//! Reading one goes through a [`ShardSnapshot`], a forward-only cursor over
//! the shard's contents frozen at the time the snapshot was taken.
//!
//! Snapshots are handed around as [`ShardSnapshotRef`] handles: reference
//! counted, released when the last holder drops.

mod memory;

pub use memory::{MemShard, MemShardSnapshot, ShardRecord};

use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;

/// Read-only iteration over one shard as of a point in time.
///
/// Once [`valid`](ShardSnapshot::valid) returns false it must never return
/// true again.
pub trait ShardSnapshot: Send {
    /// Returns true if positioned on a record.
    fn valid(&mut self) -> bool;

    /// Advances to the next record.
    fn next(&mut self);

    /// Hash of the current key in primary hash space.
    fn primary_hash(&self) -> u32;

    /// Hash of the current record in secondary hash space.
    fn secondary_hash(&self) -> u32;

    /// Version of the current record.
    fn version(&self) -> u64;

    /// Key of the current record.
    fn key(&self) -> Bytes;

    /// Value fields of the current record.
    fn value(&self) -> Vec<Bytes>;
}

/// Shared handle to a shard snapshot.
pub type ShardSnapshotRef = Arc<Mutex<dyn ShardSnapshot>>;

/// Wraps a shard snapshot in a shared handle.
pub fn shared<S: ShardSnapshot + 'static>(snapshot: S) -> ShardSnapshotRef {
    Arc::new(Mutex::new(snapshot))
}

/// A flushed shard that can produce point-in-time snapshots.
pub trait Shard: Send + Sync {
    /// Takes a snapshot of the shard's current contents.
    fn snapshot(&self) -> ShardSnapshotRef;
}
