//! # TailCursor - Consistent Read Cursors for Shard + Log Storage
//!
//! TailCursor provides non-blocking read cursors for a key-value storage
//! engine made of immutable, flushed shards plus a live, concurrently
//! appended log. A reader iterates "everything flushed, then everything
//! logged since" without holding a lock that blocks writers and without
//! copying the dataset.
//!
//! ## Architecture
//!
//! - **ShardSnapshotMerger**: one cursor over many shard snapshots, newest
//!   shard first, dropping each shard as soon as it is exhausted
//! - **RollingCursor**: drains a merger, then continues into the log tail,
//!   flagging only primary records as values
//! - **LockingLog**: append-only log that readers iterate while a writer
//!   appends
//! - **Store**: hands out cursors whose shard set and log position are
//!   captured together
//!
//! ## Example Usage
//!
//! ```rust
//! use bytes::Bytes;
//! use std::sync::Arc;
//! use tailcursor::shard::{MemShard, ShardRecord};
//! use tailcursor::wal::{Coordinate, LogEntry};
//! use tailcursor::{Cursor, Options, Store};
//!
//! # fn main() -> Result<(), tailcursor::Error> {
//! let store = Store::new(Options::default())?;
//!
//! // A flushed shard
//! let shard = MemShard::new(vec![ShardRecord::new("k1", vec![Bytes::from("v1")], 1)]);
//! store.add_shard(Arc::new(shard), 0)?;
//!
//! // Unflushed writes
//! store.append(LogEntry::new(Coordinate::primary(7, 7), 2, "k2", vec![Bytes::from("v2")]))?;
//!
//! let mut cursor = store.rolling_snapshot();
//! while cursor.valid() {
//!     if cursor.has_value() {
//!         println!("{:?} => {:?}", cursor.key(), cursor.value());
//!     }
//!     cursor.next();
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod config;
pub mod cursor;
pub mod error;
pub mod rolling;
pub mod shard;
pub mod snapshot;
pub mod wal;

// Re-exports
pub use config::Options;
pub use cursor::{Cursor, CursorEntry, Entries};
pub use error::{Error, Result};
pub use rolling::{Phase, RollingCursor};
pub use snapshot::{ShardSnapshotMerger, SharedMerger};

use parking_lot::RwLock;
use shard::Shard;
use std::sync::Arc;
use wal::{LockingLog, LogEntry};

/// The store handle that owns the shard set and the log.
///
/// Writers append to the log and periodically install flushed shards; readers
/// take snapshots or rolling snapshots.
///
/// # Thread Safety
///
/// `Store` can be shared across threads using `Arc<Store>`. Taking a cursor
/// holds the shard lock only while the shard set and log position are
/// captured; iterating the cursor takes no store-wide lock.
pub struct Store {
    /// Configuration options
    options: Options,

    /// Flushed shards, oldest first
    shards: RwLock<Vec<Arc<dyn Shard>>>,

    /// Records not yet flushed into a shard
    log: LockingLog<LogEntry>,
}

impl Store {
    /// Creates an empty store with the given options.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid.
    pub fn new(options: Options) -> Result<Self> {
        options.validate()?;

        log::info!(
            "Opening store: max_shards={}, max_log_entries={}",
            options.max_shards,
            options.max_log_entries
        );

        Ok(Self {
            options,
            shards: RwLock::new(Vec::new()),
            log: LockingLog::new(),
        })
    }

    /// Appends a record to the log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LogFull`] if the log already retains
    /// `max_log_entries` records.
    pub fn append(&self, entry: LogEntry) -> Result<()> {
        let limit = self.options.max_log_entries;
        self.log.try_append(entry, limit).map_err(|entry| {
            log::warn!("Log full, rejecting append of version {}", entry.version);
            Error::LogFull { limit }
        })
    }

    /// Installs a flushed shard as the newest one and trims the log records
    /// it now holds.
    ///
    /// Both happen in one critical section, so a cursor sees either the old
    /// shard set with the untrimmed log or the new set with the trimmed log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyShards`] if the store already holds
    /// `max_shards` shards.
    pub fn add_shard(&self, shard: Arc<dyn Shard>, flushed_log_entries: usize) -> Result<()> {
        let mut shards = self.shards.write();

        let limit = self.options.max_shards;
        if shards.len() >= limit {
            return Err(Error::TooManyShards { limit });
        }

        shards.push(shard);
        let trimmed = self.log.trim_front(flushed_log_entries);

        log::info!("Installed shard #{}, trimmed {} log records", shards.len(), trimmed);
        if trimmed < flushed_log_entries {
            log::warn!(
                "Asked to trim {} log records but only {} were retained",
                flushed_log_entries,
                trimmed
            );
        }

        Ok(())
    }

    /// Takes a snapshot of every shard.
    pub fn snapshot(&self) -> ShardSnapshotMerger {
        let shards = self.shards.read();
        Self::snapshot_shards(&shards)
    }

    /// Takes a rolling snapshot: every shard, then the log from its oldest
    /// retained record onward.
    pub fn rolling_snapshot(&self) -> RollingCursor {
        let shards = self.shards.read();
        let log = self.log.iter();
        let snapshot = Self::snapshot_shards(&shards);
        drop(shards);

        RollingCursor::new(log, snapshot.into_shared())
    }

    fn snapshot_shards(shards: &[Arc<dyn Shard>]) -> ShardSnapshotMerger {
        ShardSnapshotMerger::new(shards.iter().map(|shard| shard.snapshot()).collect())
    }

    /// Returns the number of installed shards.
    pub fn num_shards(&self) -> usize {
        self.shards.read().len()
    }

    /// Returns the number of log records not yet flushed.
    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    /// Returns the store's options.
    pub fn options(&self) -> &Options {
        &self.options
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("options", &self.options)
            .field("shards", &self.num_shards())
            .field("log_len", &self.log_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::{MemShard, ShardRecord};
    use bytes::Bytes;
    use crate::wal::Coordinate;

    fn entry(key: &'static str, version: u64) -> LogEntry {
        LogEntry::new(Coordinate::primary(0, 0), version, key, vec![Bytes::from(key)])
    }

    fn mem_shard(keys: &[&'static str]) -> Arc<dyn Shard> {
        let records = keys
            .iter()
            .enumerate()
            .map(|(i, key)| ShardRecord::new(*key, Vec::new(), i as u64))
            .collect();
        Arc::new(MemShard::new(records))
    }

    fn keys(cursor: &mut impl Cursor) -> Vec<Bytes> {
        cursor.entries().map(|e| e.key).collect()
    }

    #[test]
    fn test_store_new_validates_options() {
        assert!(Store::new(Options::default()).is_ok());
        assert!(matches!(
            Store::new(Options::new().max_shards(0)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rolling_snapshot_order() {
        let store = Store::new(Options::default()).unwrap();
        store.add_shard(mem_shard(&["a1", "a2"]), 0).unwrap();
        store.add_shard(mem_shard(&["b1"]), 0).unwrap();
        store.append(entry("l1", 10)).unwrap();

        let mut cursor = store.rolling_snapshot();
        assert_eq!(
            keys(&mut cursor),
            vec![Bytes::from("b1"), Bytes::from("a1"), Bytes::from("a2"), Bytes::from("l1")]
        );
    }

    #[test]
    fn test_snapshot_excludes_log() {
        let store = Store::new(Options::default()).unwrap();
        store.add_shard(mem_shard(&["a1"]), 0).unwrap();
        store.append(entry("l1", 10)).unwrap();

        let mut snapshot = store.snapshot();
        assert_eq!(keys(&mut snapshot), vec![Bytes::from("a1")]);
    }

    #[test]
    fn test_add_shard_trims_log() {
        let store = Store::new(Options::default()).unwrap();
        store.append(entry("k1", 1)).unwrap();
        store.append(entry("k2", 2)).unwrap();
        store.append(entry("k3", 3)).unwrap();

        let mut before = store.rolling_snapshot();

        store.add_shard(mem_shard(&["k1", "k2"]), 2).unwrap();
        assert_eq!(store.log_len(), 1);

        let expected = vec![Bytes::from("k1"), Bytes::from("k2"), Bytes::from("k3")];
        let mut after = store.rolling_snapshot();
        assert_eq!(keys(&mut after), expected);

        // Cursors taken before the flush still see the untrimmed log
        assert_eq!(keys(&mut before), expected);
    }

    #[test]
    fn test_log_full() {
        let store = Store::new(Options::new().max_log_entries(2)).unwrap();
        store.append(entry("k1", 1)).unwrap();
        store.append(entry("k2", 2)).unwrap();

        let err = store.append(entry("k3", 3)).unwrap_err();
        assert!(matches!(err, Error::LogFull { limit: 2 }));

        // Flushing frees room
        store.add_shard(mem_shard(&["k1"]), 1).unwrap();
        assert!(store.append(entry("k3", 3)).is_ok());
    }

    #[test]
    fn test_concurrent_appends_respect_log_limit() {
        let store = Arc::new(Store::new(Options::new().max_log_entries(64)).unwrap());

        let mut writers = vec![];
        for t in 0..8u64 {
            let store = Arc::clone(&store);
            writers.push(std::thread::spawn(move || {
                (0..32u64)
                    .filter(|i| store.append(entry("k", t * 32 + i)).is_ok())
                    .count()
            }));
        }

        let accepted: usize = writers.into_iter().map(|w| w.join().unwrap()).sum();
        assert_eq!(accepted, 64);
        assert_eq!(store.log_len(), 64);
    }

    #[test]
    fn test_too_many_shards() {
        let store = Store::new(Options::new().max_shards(1)).unwrap();
        store.add_shard(mem_shard(&["a"]), 0).unwrap();

        let err = store.add_shard(mem_shard(&["b"]), 0).unwrap_err();
        assert!(matches!(err, Error::TooManyShards { limit: 1 }));
        assert_eq!(store.num_shards(), 1);
    }

    #[test]
    fn test_empty_store() {
        let store = Store::new(Options::default()).unwrap();
        let mut cursor = store.rolling_snapshot();
        assert!(!cursor.valid());
        assert_eq!(cursor.phase(), Phase::Terminal);
        assert!(!store.snapshot().valid());
    }
}
