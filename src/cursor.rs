//! The cursor contract shared by every read path.
//!
//! Both [`ShardSnapshotMerger`](crate::snapshot::ShardSnapshotMerger) and
//! [`RollingCursor`](crate::rolling::RollingCursor) implement [`Cursor`], so
//! callers can drive either one without knowing which they hold.

use bytes::Bytes;

/// A positional, forward-only cursor over key/value records.
///
/// Accessors are always safe to call. When the cursor is not positioned on a
/// record they return an empty key, an empty value and version `0`. Callers
/// must still call [`valid`](Cursor::valid) first to get meaningful data.
///
/// # Example
///
/// ```rust
/// use tailcursor::{Cursor, ShardSnapshotMerger};
///
/// let mut cursor = ShardSnapshotMerger::new(Vec::new());
/// while cursor.valid() {
///     println!("{:?} => {:?}", cursor.key(), cursor.value());
///     cursor.next();
/// }
/// assert!(cursor.key().is_empty());
/// ```
pub trait Cursor {
    /// Returns true if the cursor is positioned on a record.
    ///
    /// Once this returns false it never returns true again.
    fn valid(&mut self) -> bool;

    /// Advances to the next record. No-op once exhausted.
    fn next(&mut self);

    /// Returns true if the current position holds a primary key/value record.
    fn has_value(&self) -> bool;

    /// Returns the version of the current record, or `0`.
    fn version(&self) -> u64;

    /// Returns the key of the current record, or an empty buffer.
    fn key(&self) -> Bytes;

    /// Returns the value fields of the current record, or an empty sequence.
    fn value(&self) -> Vec<Bytes>;

    /// Returns an iterator that drains the remaining positions.
    fn entries(&mut self) -> Entries<'_, Self>
    where
        Self: Sized,
    {
        Entries { cursor: self }
    }
}

/// A record read from a [`Cursor`] position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorEntry {
    /// The record key.
    pub key: Bytes,
    /// The record value fields.
    pub value: Vec<Bytes>,
    /// The record version.
    pub version: u64,
    /// Whether the position held a primary key/value record.
    pub has_value: bool,
}

/// Iterator adapter returned by [`Cursor::entries`].
///
/// Yields every remaining position, including log records that are not
/// primary records; check [`CursorEntry::has_value`] to filter those.
pub struct Entries<'a, C> {
    cursor: &'a mut C,
}

impl<C: Cursor> Iterator for Entries<'_, C> {
    type Item = CursorEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.cursor.valid() {
            return None;
        }

        let entry = CursorEntry {
            key: self.cursor.key(),
            value: self.cursor.value(),
            version: self.cursor.version(),
            has_value: self.cursor.has_value(),
        };
        self.cursor.next();
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cursor over a fixed list of (key, version) pairs.
    struct ListCursor {
        items: Vec<(&'static str, u64)>,
        position: usize,
    }

    impl Cursor for ListCursor {
        fn valid(&mut self) -> bool {
            self.position < self.items.len()
        }

        fn next(&mut self) {
            if self.position < self.items.len() {
                self.position += 1;
            }
        }

        fn has_value(&self) -> bool {
            self.position < self.items.len()
        }

        fn version(&self) -> u64 {
            self.items.get(self.position).map_or(0, |(_, v)| *v)
        }

        fn key(&self) -> Bytes {
            self.items
                .get(self.position)
                .map(|&(k, _)| Bytes::from_static(k.as_bytes()))
                .unwrap_or_default()
        }

        fn value(&self) -> Vec<Bytes> {
            Vec::new()
        }
    }

    #[test]
    fn test_entries_drains_cursor() {
        let mut cursor = ListCursor {
            items: vec![("a", 1), ("b", 2)],
            position: 0,
        };

        let entries: Vec<_> = cursor.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, Bytes::from_static(b"a"));
        assert_eq!(entries[1].version, 2);
        assert!(entries.iter().all(|e| e.has_value));

        assert!(!cursor.valid());
        assert_eq!(cursor.entries().count(), 0);
    }
}
