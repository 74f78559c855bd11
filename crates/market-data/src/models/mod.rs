//! Data models for quote fetching.

mod quote;
mod twse;

pub use quote::{normalize_symbol, Quote, Sample};
pub use twse::TwseDayResponse;
