//! Quotewatch core crate.
//!
//! Couples the market data provider with a TTL cache and a background
//! poller:
//!
//! - [`QuoteCache`] - concurrent symbol-keyed cache with lazy expiry
//! - [`QuotePoller`] - cancellable fetch -> cache -> publish loop over a
//!   mutable watchlist
//! - [`QuoteService`] - on-demand quote access sharing the same cache, for
//!   callers outside the poll cadence
//!
//! The owning process constructs these around one provider and one cache
//! instance, subscribes to [`QuotePoller::subscribe`] for per-cycle
//! batches, and stops the poller explicitly on shutdown.

pub mod cache;
pub mod constants;
pub mod errors;
pub mod poller;
pub mod service;

pub use cache::QuoteCache;
pub use errors::{CoreError, Result};
pub use poller::{PollerConfig, QuotePoller};
pub use service::QuoteService;

// The provider surface consumers wire in alongside the core types.
pub use quotewatch_market_data::{
    MarketDataError, Quote, QuoteProvider, Sample, TwseConfig, TwseProvider,
};
