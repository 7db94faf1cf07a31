//! Rolling snapshot: flushed shards followed by the live log tail.
//!
//! A [`RollingCursor`] first drains its [`ShardSnapshotMerger`], then reads
//! the log from the position it was given at construction. The two phases
//! never interleave, and the handoff happens exactly once.

use bytes::Bytes;
use std::fmt;

use crate::cursor::Cursor;
use crate::snapshot::SharedMerger;
use crate::wal::{LogEntry, LogIterator};

/// Which source a [`RollingCursor`] is currently reading from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reading shard snapshots.
    Snapshot,
    /// Shards are drained; reading log records.
    Log,
    /// Both sources are exhausted.
    Terminal,
}

/// A cursor over "everything flushed, then everything logged since".
///
/// While the merger is valid every accessor delegates to it. Once it is
/// exhausted the cursor reads log records; in that phase
/// [`has_value`](Cursor::has_value) is true only for primary records, while
/// `key`/`value`/`version` still return the raw record.
///
/// After [`next`](Cursor::next) the accessors read the new position directly,
/// including across the handoff from the last shard to the log.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use tailcursor::wal::{Coordinate, LockingLog, LogEntry};
/// use tailcursor::{Cursor, RollingCursor, ShardSnapshotMerger};
///
/// let log = LockingLog::new();
/// log.append(LogEntry::new(Coordinate::primary(1, 1), 9, "k3", vec![Bytes::from("v3")]));
///
/// let merger = ShardSnapshotMerger::new(Vec::new()).into_shared();
/// let mut cursor = RollingCursor::new(log.iter(), merger);
///
/// assert!(cursor.valid());
/// assert!(cursor.has_value());
/// assert_eq!(cursor.key(), Bytes::from("k3"));
/// cursor.next();
/// assert!(!cursor.valid());
/// ```
pub struct RollingCursor {
    log: LogIterator<LogEntry>,
    snapshot: SharedMerger,
    /// Set once the cursor has handed off from the merger to the log
    handed_off: bool,
}

impl RollingCursor {
    /// Creates a rolling cursor from a log position and a shared merger.
    ///
    /// Exhausted shards are evicted immediately.
    pub fn new(log: LogIterator<LogEntry>, snapshot: SharedMerger) -> Self {
        let mut cursor = Self {
            log,
            snapshot,
            handed_off: false,
        };
        cursor.valid();
        cursor
    }

    /// Returns the phase the cursor is in.
    pub fn phase(&mut self) -> Phase {
        if self.snapshot.lock().valid() {
            Phase::Snapshot
        } else if self.log.valid() {
            Phase::Log
        } else {
            Phase::Terminal
        }
    }

    /// Current log record, once the merger is exhausted.
    fn log_entry(&self) -> Option<&LogEntry> {
        if self.snapshot.lock().valid() {
            None
        } else {
            self.log.get()
        }
    }
}

impl Cursor for RollingCursor {
    fn valid(&mut self) -> bool {
        if self.snapshot.lock().valid() {
            return true;
        }

        let valid = self.log.valid();
        if valid && !self.handed_off {
            self.handed_off = true;
            log::debug!("Rolling cursor drained shard snapshots, reading log tail");
        }
        valid
    }

    fn next(&mut self) {
        let mut snapshot = self.snapshot.lock();
        if !snapshot.valid() {
            drop(snapshot);
            self.log.next();
            return;
        }

        snapshot.next();
        if !snapshot.valid() {
            // The last shard just drained; position on the first log record
            self.log.resolve();
        }
    }

    /// In the log phase, true only for primary records.
    fn has_value(&self) -> bool {
        {
            let mut snapshot = self.snapshot.lock();
            if snapshot.valid() {
                return snapshot.has_value();
            }
        }

        self.log.get().is_some_and(LogEntry::is_primary)
    }

    fn version(&self) -> u64 {
        {
            let mut snapshot = self.snapshot.lock();
            if snapshot.valid() {
                return snapshot.version();
            }
        }

        self.log_entry().map_or(0, |entry| entry.version)
    }

    fn key(&self) -> Bytes {
        {
            let mut snapshot = self.snapshot.lock();
            if snapshot.valid() {
                return snapshot.key();
            }
        }

        self.log_entry().map(|entry| entry.key.clone()).unwrap_or_default()
    }

    fn value(&self) -> Vec<Bytes> {
        {
            let mut snapshot = self.snapshot.lock();
            if snapshot.valid() {
                return snapshot.value();
            }
        }

        self.log_entry().map(|entry| entry.value.clone()).unwrap_or_default()
    }
}

impl fmt::Debug for RollingCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollingCursor")
            .field("log", &self.log)
            .field("snapshot", &*self.snapshot.lock())
            .field("handed_off", &self.handed_off)
            .finish()
    }
}
