//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use log::warn;
use tokio_util::sync::CancellationToken;

use crate::errors::{MarketDataError, Result, RetryClass};

/// Run `op` up to `max_attempts` times, sleeping `2^attempt` seconds after
/// failed attempt number `attempt` (1-based).
///
/// Errors classified [`RetryClass::Never`] propagate immediately.
/// Cancellation is honored before each attempt and during the backoff
/// waits. Once the budget is spent the last error is returned wrapped in
/// [`MarketDataError::Exhausted`].
pub async fn with_backoff<T, F, Fut>(
    label: &str,
    max_attempts: u32,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        if cancel.is_cancelled() {
            return Err(MarketDataError::Cancelled);
        }

        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.retry_class() == RetryClass::Never => return Err(e),
            Err(e) => e,
        };

        warn!("Attempt {attempt}/{max_attempts} for {label} failed: {error}");

        if attempt >= max_attempts {
            return Err(MarketDataError::Exhausted {
                symbol: label.to_string(),
                attempts: max_attempts,
                source: Box::new(error),
            });
        }

        let wait = Duration::from_secs(2u64.saturating_pow(attempt));
        tokio::select! {
            _ = cancel.cancelled() => return Err(MarketDataError::Cancelled),
            _ = tokio::time::sleep(wait) => {}
        }
    }
}
