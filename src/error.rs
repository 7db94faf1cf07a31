//! Error types for the TailCursor store.
//!
//! Cursors themselves never fail: exhaustion and absence are reported through
//! `valid()`/`has_value()` and default accessor values. Errors only arise when
//! configuring a [`Store`](crate::Store) or mutating its shard set and log.

/// The result type used throughout TailCursor.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for TailCursor operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The log already retains as many records as it is allowed to.
    #[error("Log full: {limit} records retained")]
    LogFull {
        /// The configured record limit.
        limit: usize,
    },

    /// The store already holds as many shards as it is allowed to.
    #[error("Too many shards: limit is {limit}")]
    TooManyShards {
        /// The configured shard limit.
        limit: usize,
    },
}

impl Error {
    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
