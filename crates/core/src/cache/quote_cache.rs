use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::debug;
use quotewatch_market_data::Quote;

use crate::constants::DEFAULT_CACHE_TTL;

struct CacheEntry {
    quote: Quote,
    inserted_at: Instant,
}

/// Concurrent quote cache with a fixed time-to-live.
///
/// One map holds both the quote and its insertion instant, so there is no
/// race window between a value lookup and a timestamp lookup. Expiry is
/// checked lazily on read; there is no background sweeper. Reads and writes
/// may run concurrently from the poller and on-demand callers.
pub struct QuoteCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl QuoteCache {
    /// Create a cache with the default 5-minute TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a fresh cached quote.
    ///
    /// Returns `None` for an empty symbol, an absent entry, or an entry
    /// whose age has reached the TTL; an expired entry is removed on the
    /// way out.
    pub fn try_get(&self, symbol: &str) -> Option<Quote> {
        self.try_get_at(symbol, Instant::now())
    }

    /// Like [`try_get`](Self::try_get) with an explicit current instant, so
    /// tests can simulate the TTL window without sleeping.
    pub(crate) fn try_get_at(&self, symbol: &str, now: Instant) -> Option<Quote> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return None;
        }

        // The read guard must drop before the remove below, or the shard
        // lock would deadlock.
        let expired = match self.entries.get(symbol) {
            None => return None,
            Some(entry) => {
                if now.saturating_duration_since(entry.inserted_at) < self.ttl {
                    return Some(entry.quote.clone());
                }
                true
            }
        };

        if expired {
            debug!("Cache expired for {symbol}");
            self.entries.remove(symbol);
        }
        None
    }

    /// Insert or overwrite the entry for the quote's symbol, stamped with
    /// the current instant. Quotes with an empty symbol are ignored.
    /// Last writer wins under concurrent sets to the same key.
    pub fn set(&self, quote: Quote) {
        self.set_at(quote, Instant::now());
    }

    pub(crate) fn set_at(&self, quote: Quote, now: Instant) {
        let symbol = quote.symbol.trim();
        if symbol.is_empty() {
            return;
        }

        let key = symbol.to_string();
        debug!("Cached quote for {key}");
        self.entries.insert(
            key,
            CacheEntry {
                quote,
                inserted_at: now,
            },
        );
    }

    /// Apply [`set`](Self::set) to each quote. No atomicity across the
    /// batch: a concurrent reader may observe it partially applied.
    pub fn set_many(&self, quotes: impl IntoIterator<Item = Quote>) {
        for quote in quotes {
            self.set(quote);
        }
    }

    /// Remove the entry for one symbol. No-op if empty or absent.
    pub fn remove(&self, symbol: &str) {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return;
        }
        self.entries.remove(symbol);
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries currently stored, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}
