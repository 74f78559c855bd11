//! Quotewatch market data crate.
//!
//! Fetches daily quote data from the Taiwan Stock Exchange and normalizes
//! it into domain records.
//!
//! # Overview
//!
//! - [`Sample`] / [`Quote`] - normalized domain records
//! - [`QuoteProvider`] - async seam for quote sources
//! - [`TwseProvider`] - STOCK_DAY client with ROC-calendar parsing and
//!   retry with exponential backoff
//! - [`MarketDataError`] - error enum with retry classification
//!
//! Fetches are cancellable through a `CancellationToken`; cancellation is
//! honored during backoff waits and in-flight requests and surfaces as
//! [`MarketDataError::Cancelled`], distinct from a failed fetch.

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::{MarketDataError, Result, RetryClass};
pub use models::{normalize_symbol, Quote, Sample, TwseDayResponse};
pub use provider::{with_backoff, QuoteProvider, TwseConfig, TwseProvider};
