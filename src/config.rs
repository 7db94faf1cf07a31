//! Configuration options for the TailCursor store.

/// Configuration options for creating a [`Store`](crate::Store).
///
/// Cursors have no options of their own: which shards participate and where
/// the log position starts is decided by the store when a cursor is built.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum number of shards the store will hold at once.
    /// Default: 256
    pub max_shards: usize,

    /// Maximum number of unflushed records the log will retain.
    /// Appends beyond this fail until a flush trims the log.
    /// Default: 1M records
    pub max_log_entries: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_shards: 256,
            max_log_entries: 1024 * 1024,
        }
    }
}

impl Options {
    /// Creates a new Options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of shards.
    pub fn max_shards(mut self, value: usize) -> Self {
        self.max_shards = value;
        self
    }

    /// Sets the maximum number of retained log records.
    pub fn max_log_entries(mut self, value: usize) -> Self {
        self.max_log_entries = value;
        self
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_shards == 0 {
            return Err(crate::Error::invalid_argument("max_shards must be > 0"));
        }
        if self.max_log_entries == 0 {
            return Err(crate::Error::invalid_argument("max_log_entries must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();
        assert_eq!(opts.max_shards, 256);
        assert_eq!(opts.max_log_entries, 1024 * 1024);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_options_builder() {
        let opts = Options::new().max_shards(8).max_log_entries(100);
        assert_eq!(opts.max_shards, 8);
        assert_eq!(opts.max_log_entries, 100);
    }

    #[test]
    fn test_options_validation() {
        assert!(Options::new().max_shards(0).validate().is_err());
        assert!(Options::new().max_log_entries(0).validate().is_err());
    }
}
