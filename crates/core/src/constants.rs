use std::time::Duration;

/// Cached quotes at least this old are treated as absent.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Lower bound on the poll interval. Keeps a misconfigured host from
/// hammering the provider.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll interval used when the host supplies none.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Batches buffered per subscriber before a lagging receiver starts
/// missing updates.
pub const UPDATE_CHANNEL_CAPACITY: usize = 16;
