//! Core error types for the quote feed.

use std::time::Duration;

use quotewatch_market_data::MarketDataError;
use thiserror::Error;

/// Type alias for Result using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors surfaced by the cache, poller, and service layers.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The watchlist must always contain at least one symbol.
    #[error("Watchlist cannot be empty")]
    EmptyWatchlist,

    /// The requested poll interval is below the allowed minimum.
    #[error("Poll interval must be at least {min:?}, got {requested:?}")]
    IntervalTooShort {
        /// The rejected interval.
        requested: Duration,
        /// The enforced minimum.
        min: Duration,
    },

    /// The poller already has a live loop; stop it before starting again.
    #[error("Poller is already running")]
    AlreadyRunning,

    /// A fetch through the provider failed.
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),
}
