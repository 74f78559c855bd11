//! On-demand quote access over the shared provider and cache.

use std::sync::Arc;

use log::debug;
use quotewatch_market_data::{normalize_symbol, Quote, QuoteProvider};
use tokio_util::sync::CancellationToken;

use crate::cache::QuoteCache;
use crate::errors::Result;

/// Facade for callers that want quotes outside the poll cadence.
///
/// Shares the provider and cache with the poller, so an on-demand refresh
/// and the background loop stay coherent: every fetch writes through the
/// same cache.
pub struct QuoteService {
    provider: Arc<dyn QuoteProvider>,
    cache: Arc<QuoteCache>,
}

impl QuoteService {
    pub fn new(provider: Arc<dyn QuoteProvider>, cache: Arc<QuoteCache>) -> Self {
        Self { provider, cache }
    }

    /// The shared cache, for callers that want cached reads without ever
    /// forcing a network call.
    pub fn cache(&self) -> &Arc<QuoteCache> {
        &self.cache
    }

    /// Get a quote, serving from the cache when fresh and fetching (and
    /// writing through) otherwise.
    pub async fn get_quote(&self, symbol: &str, cancel: &CancellationToken) -> Result<Quote> {
        if let Ok(key) = normalize_symbol(symbol) {
            if let Some(quote) = self.cache.try_get(&key) {
                debug!("Cache hit for {key}");
                return Ok(quote);
            }
        }

        self.refresh(symbol, cancel).await
    }

    /// Fetch a quote with up to `days` of history, bypassing the cache but
    /// writing the result through it.
    pub async fn get_history(
        &self,
        symbol: &str,
        days: usize,
        cancel: &CancellationToken,
    ) -> Result<Quote> {
        let quote = self.provider.get_history(symbol, days, cancel).await?;
        self.cache.set(quote.clone());
        Ok(quote)
    }

    /// Get quotes for several symbols: fresh cache entries are served
    /// directly, the rest are fetched concurrently and written through.
    /// Symbols whose fetch fails are omitted from the result.
    pub async fn get_quotes(&self, symbols: &[String], cancel: &CancellationToken) -> Vec<Quote> {
        let mut quotes = Vec::with_capacity(symbols.len());
        let mut misses = Vec::new();

        for symbol in symbols {
            let cached = normalize_symbol(symbol)
                .ok()
                .and_then(|key| self.cache.try_get(&key));
            match cached {
                Some(quote) => quotes.push(quote),
                None => misses.push(symbol.clone()),
            }
        }

        if !misses.is_empty() {
            let fetched = self.provider.get_quotes(&misses, cancel).await;
            self.cache.set_many(fetched.iter().cloned());
            quotes.extend(fetched);
        }

        quotes
    }

    /// Force a fetch for one symbol, ignoring any cached entry.
    pub async fn refresh(&self, symbol: &str, cancel: &CancellationToken) -> Result<Quote> {
        let quote = self.provider.get_quote(symbol, cancel).await?;
        self.cache.set(quote.clone());
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quotewatch_market_data::Result as MarketResult;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicU32,
    }

    #[async_trait]
    impl QuoteProvider for CountingProvider {
        fn id(&self) -> &'static str {
            "COUNTING"
        }

        async fn get_history(
            &self,
            symbol: &str,
            _days: usize,
            _cancel: &CancellationToken,
        ) -> MarketResult<Quote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let symbol = normalize_symbol(symbol)?;
            Ok(Quote::empty(symbol, "Test Corp"))
        }
    }

    fn service() -> (Arc<CountingProvider>, QuoteService) {
        let provider = Arc::new(CountingProvider::default());
        let cache = Arc::new(QuoteCache::new());
        let service = QuoteService::new(
            Arc::clone(&provider) as Arc<dyn QuoteProvider>,
            cache,
        );
        (provider, service)
    }

    #[tokio::test]
    async fn test_get_quote_serves_cache_hit_without_fetching() {
        let (provider, service) = service();
        let cancel = CancellationToken::new();

        service.get_quote("2330", &cancel).await.unwrap();
        service.get_quote("2330", &cancel).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_quote_normalizes_before_cache_lookup() {
        let (provider, service) = service();
        let cancel = CancellationToken::new();

        service.get_quote("2330.tw", &cancel).await.unwrap();
        let quote = service.get_quote(" 2330.TW ", &cancel).await.unwrap();

        assert_eq!(quote.symbol, "2330.TW");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_forces_fetch_despite_cache() {
        let (provider, service) = service();
        let cancel = CancellationToken::new();

        service.get_quote("2330", &cancel).await.unwrap();
        service.refresh("2330", &cancel).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_history_writes_through() {
        let (_, service) = service();
        let cancel = CancellationToken::new();

        service.get_history("2330", 30, &cancel).await.unwrap();

        assert!(service.cache().try_get("2330").is_some());
    }

    #[tokio::test]
    async fn test_get_quotes_mixes_hits_and_fetches() {
        let (provider, service) = service();
        let cancel = CancellationToken::new();

        service.get_quote("2330", &cancel).await.unwrap();

        let symbols = vec!["2330".to_string(), "0050".to_string()];
        let quotes = service.get_quotes(&symbols, &cancel).await;

        assert_eq!(quotes.len(), 2);
        // Only the miss hit the provider a second time.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(service.cache().try_get("0050").is_some());
    }
}
