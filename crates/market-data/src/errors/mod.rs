//! Error types and retry classification for quote fetching.

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Type alias for Result using [`MarketDataError`].
pub type Result<T> = std::result::Result<T, MarketDataError>;

/// Errors that can occur while fetching market data.
///
/// Each variant is classified via [`retry_class`](Self::retry_class), which
/// drives the provider's backoff loop. Malformed individual history rows are
/// not represented here at all: they are skipped during parsing and never
/// surface to the caller.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The symbol is empty or whitespace. Never retried.
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// A network error occurred while calling the provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status.
    #[error("Provider returned HTTP {0}")]
    Status(u16),

    /// The top-level provider payload could not be decoded.
    #[error("Malformed provider response: {0}")]
    Parse(String),

    /// The retry budget was spent without a successful fetch.
    #[error("Fetch for {symbol} failed after {attempts} attempts")]
    Exhausted {
        /// Symbol whose fetch was given up on.
        symbol: String,
        /// Number of attempts made.
        attempts: u32,
        /// The error from the final attempt.
        #[source]
        source: Box<MarketDataError>,
    },

    /// The operation was cancelled. Distinct from a failed fetch, so callers
    /// can tell "gave up" from "told to stop".
    #[error("Operation cancelled")]
    Cancelled,
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::InvalidSymbol(_) | Self::Exhausted { .. } | Self::Cancelled => RetryClass::Never,
            Self::Network(_) | Self::Status(_) | Self::Parse(_) => RetryClass::WithBackoff,
        }
    }
}
