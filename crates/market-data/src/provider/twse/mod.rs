//! TWSE (Taiwan Stock Exchange) quote provider.
//!
//! Fetches daily trading data from the STOCK_DAY endpoint and converts the
//! ROC-calendar rows into normalized quotes. Transient failures are retried
//! with exponential backoff; malformed rows are skipped individually.

mod company;

pub use company::company_name;

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::errors::{MarketDataError, Result};
use crate::models::{normalize_symbol, Quote, Sample, TwseDayResponse};
use crate::provider::retry::with_backoff;
use crate::provider::traits::QuoteProvider;

const PROVIDER_ID: &str = "TWSE";
const DEFAULT_BASE_URL: &str = "https://www.twse.com.tw/exchangeReport/STOCK_DAY";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// The endpoint rejects requests with a default or empty agent.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0.0.0 Safari/537.36";

/// STOCK_DAY rows: date, volume, value, open, high, low, close, change,
/// transaction count.
const MIN_ROW_FIELDS: usize = 9;
const DATE_FIELD: usize = 0;
const VOLUME_FIELD: usize = 1;
const CLOSE_FIELD: usize = 6;

/// The exchange dates rows in the ROC calendar, offset from Gregorian.
const ROC_YEAR_OFFSET: i32 = 1911;

/// Configuration for [`TwseProvider`].
#[derive(Clone, Debug)]
pub struct TwseConfig {
    /// STOCK_DAY endpoint URL.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Attempts per symbol before giving up.
    pub max_attempts: u32,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for TwseConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Quote provider backed by the exchange's daily trading report.
pub struct TwseProvider {
    client: Client,
    config: TwseConfig,
}

impl TwseProvider {
    /// Create a provider with default configuration.
    pub fn new() -> Self {
        Self::with_config(TwseConfig::default())
    }

    /// Create a provider with custom configuration.
    pub fn with_config(config: TwseConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    /// Fetch the current month's daily rows for a bare stock code.
    async fn fetch_day(
        &self,
        stock_no: &str,
        cancel: &CancellationToken,
    ) -> Result<TwseDayResponse> {
        let date = chrono::Local::now().format("%Y%m%d").to_string();
        let url = reqwest::Url::parse_with_params(
            &self.config.base_url,
            &[("response", "json"), ("stockNo", stock_no), ("date", date.as_str())],
        )
        .map_err(|e| MarketDataError::Parse(e.to_string()))?;

        let fetch = async {
            let response = self.client.get(url).send().await?;
            if !response.status().is_success() {
                return Err(MarketDataError::Status(response.status().as_u16()));
            }
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| MarketDataError::Parse(e.to_string()))
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(MarketDataError::Cancelled),
            result = fetch => result,
        }
    }
}

impl Default for TwseProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for TwseProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_history(
        &self,
        symbol: &str,
        days: usize,
        cancel: &CancellationToken,
    ) -> Result<Quote> {
        let symbol = normalize_symbol(symbol)?;
        let stock_no = strip_exchange_suffix(&symbol).to_string();

        let response = with_backoff(&symbol, self.config.max_attempts, cancel, || {
            self.fetch_day(&stock_no, cancel)
        })
        .await?;

        let quote = build_quote(&symbol, company_name(&stock_no), &response, days);
        debug!(
            "Fetched {}: price={} change={}",
            quote.symbol, quote.price, quote.change
        );
        Ok(quote)
    }
}

/// Drop the exchange suffix from an already upper-cased symbol, leaving the
/// bare code the endpoint expects.
fn strip_exchange_suffix(symbol: &str) -> &str {
    symbol.strip_suffix(".TW").unwrap_or(symbol)
}

/// Convert a fetched response into a quote.
///
/// A non-success status or empty row set is "no data" and yields an empty
/// quote, not an error.
fn build_quote(symbol: &str, company_name: String, response: &TwseDayResponse, days: usize) -> Quote {
    if !response.is_ok() || response.data.is_empty() {
        warn!("No data returned for {symbol} (stat: {:?})", response.stat);
        return Quote::empty(symbol, company_name);
    }

    Quote::from_history(symbol, company_name, parse_samples(&response.data), days)
}

fn parse_samples(rows: &[Vec<String>]) -> Vec<Sample> {
    let mut samples: Vec<Sample> = rows.iter().filter_map(|row| parse_row(row)).collect();
    samples.sort_by_key(|s| s.date);
    samples
}

/// Parse one daily row. A malformed row is skipped with a warning; it never
/// aborts the batch.
fn parse_row(row: &[String]) -> Option<Sample> {
    if row.len() < MIN_ROW_FIELDS {
        warn!("Skipping row with {} fields", row.len());
        return None;
    }

    let Some(date) = parse_roc_date(&row[DATE_FIELD]) else {
        warn!("Skipping row with unparseable date {:?}", row[DATE_FIELD]);
        return None;
    };
    let Some(volume) = parse_volume(&row[VOLUME_FIELD]) else {
        warn!("Skipping row with bad volume {:?}", row[VOLUME_FIELD]);
        return None;
    };
    let Some(close) = parse_price(&row[CLOSE_FIELD]) else {
        warn!("Skipping row with bad closing price {:?}", row[CLOSE_FIELD]);
        return None;
    };

    Some(Sample { date, close, volume })
}

/// Parse a ROC-calendar date such as `114/06/02` or `111-01-03`.
fn parse_roc_date(value: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.split(['/', '-']).collect();
    if parts.len() != 3 {
        return None;
    }

    let roc_year: i32 = parts[0].trim().parse().ok()?;
    if !(1..200).contains(&roc_year) {
        return None;
    }
    let month: u32 = parts[1].trim().parse().ok()?;
    let day: u32 = parts[2].trim().parse().ok()?;

    NaiveDate::from_ymd_opt(roc_year + ROC_YEAR_OFFSET, month, day)
}

/// Prices may carry thousands separators; `--` marks a day without trades.
fn parse_price(value: &str) -> Option<Decimal> {
    let cleaned = value.replace(',', "");
    let price = Decimal::from_str(cleaned.trim()).ok()?;
    (!price.is_sign_negative()).then_some(price)
}

fn parse_volume(value: &str) -> Option<u64> {
    value.replace(',', "").trim().parse().ok()
}
