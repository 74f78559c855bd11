//! Quote provider trait definition.

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::errors::{MarketDataError, Result};
use crate::models::Quote;

/// Trait for quote data sources.
///
/// Implementations own their transport and retry policy. All methods honor
/// the cancellation token promptly, including during backoff waits.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs.
    fn id(&self) -> &'static str;

    /// Fetch a quote with up to `days` samples of history.
    async fn get_history(
        &self,
        symbol: &str,
        days: usize,
        cancel: &CancellationToken,
    ) -> Result<Quote>;

    /// Fetch the latest quote for a symbol.
    async fn get_quote(&self, symbol: &str, cancel: &CancellationToken) -> Result<Quote> {
        self.get_history(symbol, 1, cancel).await
    }

    /// Fetch quotes for several symbols, one concurrent fetch per symbol.
    ///
    /// Partial success: a symbol that fails after exhausting its retries is
    /// dropped from the result with a warning, so one dead symbol never
    /// starves the rest of the batch. Cancelled fetches are dropped quietly.
    async fn get_quotes(&self, symbols: &[String], cancel: &CancellationToken) -> Vec<Quote> {
        let fetches = symbols.iter().map(|symbol| self.get_quote(symbol, cancel));

        join_all(fetches)
            .await
            .into_iter()
            .zip(symbols)
            .filter_map(|(result, symbol)| match result {
                Ok(quote) => Some(quote),
                Err(MarketDataError::Cancelled) => {
                    debug!("Fetch for {symbol} cancelled");
                    None
                }
                Err(e) => {
                    warn!("Dropping {symbol} from batch: {e}");
                    None
                }
            })
            .collect()
    }
}
