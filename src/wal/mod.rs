//! Concurrent append-only log.
//!
//! The log holds records that have been written but not yet flushed into a
//! shard. Readers iterate it while a writer keeps appending.
//!
//! ## Architecture
//!
//! - **Linked nodes**: each record lives in its own `Arc` node; a node's
//!   successor slot is guarded by its own lock
//! - **Publishing**: appends are serialized by the log lock and publish a
//!   fully built node, so readers never see a partial record
//! - **Trimming**: flushed records are unlinked from the front; iterators
//!   that still point into the trimmed prefix keep those nodes alive
//!
//! ## Usage
//!
//! ```rust
//! use tailcursor::wal::LockingLog;
//!
//! let log = LockingLog::new();
//! log.append(1u64);
//! log.append(2u64);
//!
//! let mut iter = log.iter();
//! while iter.valid() {
//!     println!("Record: {:?}", iter.get());
//!     iter.next();
//! }
//! ```

pub mod record;

pub use record::{Coordinate, LogEntry};

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

struct Node<T> {
    /// `None` only for the initial sentinel
    item: Option<T>,
    next: Mutex<Option<Arc<Node<T>>>>,
}

impl<T> Node<T> {
    fn new(item: Option<T>) -> Self {
        Self {
            item,
            next: Mutex::new(None),
        }
    }
}

impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        // Unlink iteratively so a long chain doesn't overflow the stack.
        let mut next = self.next.get_mut().take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.next.get_mut().take(),
                Err(_) => break,
            }
        }
    }
}

struct LogState<T> {
    /// Node preceding the oldest retained record
    head: Arc<Node<T>>,
    /// Newest node
    tail: Arc<Node<T>>,
    len: usize,
}

/// A lock-guarded, append-only FIFO that supports iteration concurrent with
/// appends.
///
/// # Thread Safety
///
/// `LockingLog` can be shared across threads with `Arc<LockingLog<T>>`.
/// Any number of [`LogIterator`]s may advance while a writer appends.
pub struct LockingLog<T> {
    state: Mutex<LogState<T>>,
}

impl<T> LockingLog<T> {
    /// Creates an empty log.
    pub fn new() -> Self {
        let sentinel = Arc::new(Node::new(None));
        let state = LogState {
            head: Arc::clone(&sentinel),
            tail: sentinel,
            len: 0,
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Appends a record to the end of the log.
    pub fn append(&self, item: T) {
        let node = Arc::new(Node::new(Some(item)));
        Self::link(&mut self.state.lock(), node);
    }

    /// Appends a record unless the log already retains `limit` records.
    ///
    /// The length check and the append happen under the same lock, so
    /// concurrent writers never push the log past `limit`. A rejected record
    /// is handed back.
    pub fn try_append(&self, item: T, limit: usize) -> std::result::Result<(), T> {
        let mut state = self.state.lock();
        if state.len >= limit {
            return Err(item);
        }

        Self::link(&mut state, Arc::new(Node::new(Some(item))));
        Ok(())
    }

    fn link(state: &mut LogState<T>, node: Arc<Node<T>>) {
        *state.tail.next.lock() = Some(Arc::clone(&node));
        state.tail = node;
        state.len += 1;
    }

    /// Returns an iterator positioned at the oldest retained record.
    pub fn iter(&self) -> LogIterator<T> {
        LogIterator::new(Arc::clone(&self.state.lock().head))
    }

    /// Returns an iterator positioned after the newest record.
    ///
    /// It observes only records appended after this call.
    pub fn iter_from_end(&self) -> LogIterator<T> {
        LogIterator::new(Arc::clone(&self.state.lock().tail))
    }

    /// Removes up to `count` records from the front of the log.
    ///
    /// Returns the number of records removed.
    pub fn trim_front(&self, count: usize) -> usize {
        let mut state = self.state.lock();
        let mut removed = 0;

        while removed < count {
            let next = state.head.next.lock().clone();
            match next {
                Some(node) => {
                    state.head = node;
                    state.len -= 1;
                    removed += 1;
                }
                None => break,
            }
        }

        removed
    }

    /// Returns the number of retained records.
    pub fn len(&self) -> usize {
        self.state.lock().len
    }

    /// Returns `true` if the log retains no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for LockingLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for LockingLog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockingLog").field("len", &self.len()).finish()
    }
}

/// A position in a [`LockingLog`].
///
/// The iterator sees every record appended before it reaches the end of the
/// log. The first time [`valid`](LogIterator::valid) finds no successor the
/// iterator latches exhausted and never becomes valid again.
pub struct LogIterator<T> {
    /// Node before the current position
    prev: Arc<Node<T>>,
    /// Current node, resolved by `valid()`, `next()` or `resolve()`
    current: Option<Arc<Node<T>>>,
    exhausted: bool,
}

impl<T> LogIterator<T> {
    fn new(prev: Arc<Node<T>>) -> Self {
        Self {
            prev,
            current: None,
            exhausted: false,
        }
    }

    /// Returns true if the iterator is positioned on a record.
    pub fn valid(&mut self) -> bool {
        if self.resolve() {
            return true;
        }

        self.exhausted = true;
        false
    }

    /// Moves to the next record. No-op once exhausted.
    ///
    /// If a successor is already linked the iterator is positioned on it, so
    /// [`get`](LogIterator::get) returns it without another `valid()`.
    pub fn next(&mut self) {
        if !self.valid() {
            return;
        }

        if let Some(current) = self.current.take() {
            self.prev = current;
        }
        self.resolve();
    }

    /// Positions the iterator on the successor of `prev` if one is linked.
    ///
    /// Unlike `valid()` this never latches exhaustion: a missing successor
    /// leaves the iterator unpositioned so later appends stay visible.
    pub(crate) fn resolve(&mut self) -> bool {
        if self.current.is_some() {
            return true;
        }
        if self.exhausted {
            return false;
        }

        self.current = self.prev.next.lock().clone();
        self.current.is_some()
    }

    /// Returns the current record.
    ///
    /// `None` before the first `valid()`, once exhausted, or after `next()`
    /// reached the end of what has been appended so far.
    pub fn get(&self) -> Option<&T> {
        self.current.as_ref().and_then(|node| node.item.as_ref())
    }
}

impl<T> Clone for LogIterator<T> {
    fn clone(&self) -> Self {
        Self {
            prev: Arc::clone(&self.prev),
            current: self.current.clone(),
            exhausted: self.exhausted,
        }
    }
}

impl<T> fmt::Debug for LogIterator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogIterator")
            .field("positioned", &self.current.is_some())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}
