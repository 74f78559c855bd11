//! Background quote polling.
//!
//! A single long-lived task fetches the watchlist on a fixed cadence,
//! writes the results through the cache, and publishes each batch to
//! subscribers. The loop only terminates through [`QuotePoller::stop`] or
//! cancellation; fetch failures are logged and the next cycle proceeds.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use log::{debug, error, info, warn};
use quotewatch_market_data::{Quote, QuoteProvider};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::QuoteCache;
use crate::constants::{DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL, UPDATE_CHANNEL_CAPACITY};
use crate::errors::{CoreError, Result};

/// Configuration for [`QuotePoller`].
#[derive(Clone, Debug)]
pub struct PollerConfig {
    /// Delay between poll cycles. Must be at least the enforced minimum.
    pub interval: Duration,

    /// Symbols refreshed each cycle. Must not be empty.
    pub watchlist: Vec<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            watchlist: vec!["2330".to_string(), "0050".to_string()],
        }
    }
}

struct RunningLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodic watchlist refresher.
///
/// At most one loop is live per poller: [`start`](Self::start) on a running
/// poller returns [`CoreError::AlreadyRunning`], so overlapping cycles
/// cannot occur by construction.
pub struct QuotePoller {
    provider: Arc<dyn QuoteProvider>,
    cache: Arc<QuoteCache>,
    interval: RwLock<Duration>,
    watchlist: RwLock<Vec<String>>,
    updates_tx: broadcast::Sender<Vec<Quote>>,
    running: Mutex<Option<RunningLoop>>,
}

impl std::fmt::Debug for QuotePoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotePoller")
            .field("provider", &self.provider.id())
            .finish_non_exhaustive()
    }
}

impl QuotePoller {
    /// Create a poller. The configuration is validated with the same rules
    /// as the setters.
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        cache: Arc<QuoteCache>,
        config: PollerConfig,
    ) -> Result<Self> {
        if config.watchlist.is_empty() {
            return Err(CoreError::EmptyWatchlist);
        }
        if config.interval < MIN_POLL_INTERVAL {
            return Err(CoreError::IntervalTooShort {
                requested: config.interval,
                min: MIN_POLL_INTERVAL,
            });
        }

        let (updates_tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        Ok(Self {
            provider,
            cache,
            interval: RwLock::new(config.interval),
            watchlist: RwLock::new(config.watchlist),
            updates_tx,
            running: Mutex::new(None),
        })
    }

    /// Change the poll cadence. Takes effect at the next cycle boundary,
    /// never mid-cycle.
    pub fn set_interval(&self, interval: Duration) -> Result<()> {
        if interval < MIN_POLL_INTERVAL {
            return Err(CoreError::IntervalTooShort {
                requested: interval,
                min: MIN_POLL_INTERVAL,
            });
        }

        *self.interval.write().unwrap() = interval;
        info!("Poll interval set to {interval:?}");
        Ok(())
    }

    /// Replace the watchlist wholesale for the next cycle.
    pub fn set_watchlist(&self, symbols: Vec<String>) -> Result<()> {
        if symbols.is_empty() {
            return Err(CoreError::EmptyWatchlist);
        }

        info!("Watchlist updated: {}", symbols.join(", "));
        *self.watchlist.write().unwrap() = symbols;
        Ok(())
    }

    /// Current poll cadence.
    pub fn interval(&self) -> Duration {
        *self.interval.read().unwrap()
    }

    /// Snapshot of the current watchlist.
    pub fn watchlist(&self) -> Vec<String> {
        self.watchlist.read().unwrap().clone()
    }

    /// Subscribe to per-cycle batches. Each completed cycle delivers the
    /// full batch of quotes fetched that cycle; batches are not retained
    /// after dispatch.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<Quote>> {
        self.updates_tx.subscribe()
    }

    /// Whether a polling loop is currently live.
    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Spawn the polling loop.
    ///
    /// Errors with [`CoreError::AlreadyRunning`] if a loop is live.
    pub fn start(self: &Arc<Self>) -> Result<()> {
        let mut running = self.running.lock().unwrap();
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return Err(CoreError::AlreadyRunning);
        }

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let poller = Arc::clone(self);
        let handle = tokio::spawn(async move {
            poller.run_loop(task_cancel).await;
        });

        *running = Some(RunningLoop { cancel, handle });
        Ok(())
    }

    /// Cancel the loop and wait for it to wind down. No-op when stopped.
    pub async fn stop(&self) {
        let running = self.running.lock().unwrap().take();

        if let Some(running) = running {
            running.cancel.cancel();
            if let Err(e) = running.handle.await {
                error!("Poller task failed to shut down cleanly: {e}");
            }
        }
    }

    async fn run_loop(&self, cancel: CancellationToken) {
        info!("Quote poller started");

        loop {
            self.run_cycle(&cancel).await;

            if cancel.is_cancelled() {
                break;
            }

            // Re-read the interval each cycle so set_interval takes effect
            // at the boundary.
            let interval = self.interval();
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        info!("Quote poller stopped");
    }

    /// One fetch -> cache -> publish cycle. Failures are contained here so
    /// the loop outlives them.
    async fn run_cycle(&self, cancel: &CancellationToken) {
        let symbols = self.watchlist();

        let batch = self.provider.get_quotes(&symbols, cancel).await;

        // A cancelled cycle must contribute nothing to the cache.
        if cancel.is_cancelled() {
            return;
        }

        if batch.is_empty() {
            warn!("Poll cycle produced no quotes for {} symbols", symbols.len());
            return;
        }

        debug!("Poll cycle fetched {} quotes", batch.len());
        self.cache.set_many(batch.iter().cloned());

        // Publish after the cache write so a subscriber that reads the
        // cache immediately sees this cycle's data.
        if self.updates_tx.send(batch).is_err() {
            debug!("No subscribers for quote updates");
        }
    }
}
