use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// One historical daily observation for a symbol.
///
/// Samples carry a calendar date only; the provider publishes one row per
/// trading day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Trading date of the observation.
    pub date: NaiveDate,

    /// Closing price for the day.
    pub close: Decimal,

    /// Traded share volume for the day.
    pub volume: u64,
}

/// Aggregated quote state for one symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Normalized symbol (trimmed, upper-cased).
    pub symbol: String,

    /// Display name of the company.
    pub company_name: String,

    /// Latest closing price.
    pub price: Decimal,

    /// Absolute change versus the previous sample's close.
    pub change: Decimal,

    /// Change as a percentage of the previous close.
    pub change_percent: Decimal,

    /// Timestamp of the most recent observation.
    pub updated_at: DateTime<Utc>,

    /// Samples ordered ascending by date. May be empty.
    pub history: Vec<Sample>,
}

impl Quote {
    /// Create a zero-valued quote with no history.
    ///
    /// Used when the provider reports success but has no rows for the
    /// symbol. This is "no data", not an error.
    pub fn empty(symbol: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            company_name: company_name.into(),
            price: Decimal::ZERO,
            change: Decimal::ZERO,
            change_percent: Decimal::ZERO,
            updated_at: Utc::now(),
            history: Vec::new(),
        }
    }

    /// Build a quote from historical samples.
    ///
    /// Samples are sorted ascending by date. Price and change come from the
    /// two most recent samples: with a single sample the change is zero, and
    /// a zero previous close yields a zero percentage. The retained history
    /// is the most recent `days` samples (fewer if unavailable).
    pub fn from_history(
        symbol: impl Into<String>,
        company_name: impl Into<String>,
        mut samples: Vec<Sample>,
        days: usize,
    ) -> Self {
        let symbol = symbol.into();
        let company_name = company_name.into();

        samples.sort_by_key(|s| s.date);

        let Some(latest) = samples.last() else {
            return Self::empty(symbol, company_name);
        };

        let previous_close = if samples.len() > 1 {
            samples[samples.len() - 2].close
        } else {
            latest.close
        };

        let change = latest.close - previous_close;
        let change_percent = if previous_close.is_zero() {
            Decimal::ZERO
        } else {
            change / previous_close * Decimal::ONE_HUNDRED
        };

        let updated_at = latest.date.and_time(NaiveTime::MIN).and_utc();
        let price = latest.close;
        let keep_from = samples.len().saturating_sub(days.max(1));

        Self {
            symbol,
            company_name,
            price,
            change,
            change_percent,
            updated_at,
            history: samples.split_off(keep_from),
        }
    }
}

/// Normalize a symbol for lookups and cache keys: trim and upper-case.
///
/// Empty or whitespace-only input is rejected.
pub fn normalize_symbol(symbol: &str) -> Result<String, MarketDataError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(MarketDataError::InvalidSymbol(symbol.to_string()));
    }
    Ok(trimmed.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rust_decimal_macros::dec;

    fn sample(date: (i32, u32, u32), close: Decimal) -> Sample {
        Sample {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_change_from_two_samples() {
        let quote = Quote::from_history(
            "2330",
            "台積電",
            vec![sample((2025, 6, 1), dec!(10.00)), sample((2025, 6, 2), dec!(12.00))],
            30,
        );

        assert_eq!(quote.price, dec!(12.00));
        assert_eq!(quote.change, dec!(2.00));
        assert_eq!(quote.change_percent, dec!(20.00));
    }

    #[test]
    fn test_single_sample_has_zero_change() {
        let quote = Quote::from_history("2330", "台積電", vec![sample((2025, 6, 2), dec!(25.50))], 1);

        assert_eq!(quote.price, dec!(25.50));
        assert_eq!(quote.change, Decimal::ZERO);
        assert_eq!(quote.change_percent, Decimal::ZERO);
    }

    #[test]
    fn test_zero_previous_close_yields_zero_percent() {
        let quote = Quote::from_history(
            "2330",
            "台積電",
            vec![sample((2025, 6, 1), Decimal::ZERO), sample((2025, 6, 2), dec!(5.00))],
            30,
        );

        assert_eq!(quote.change, dec!(5.00));
        assert_eq!(quote.change_percent, Decimal::ZERO);
    }

    #[test]
    fn test_no_samples_yields_empty_quote() {
        let quote = Quote::from_history("2330", "台積電", vec![], 30);

        assert_eq!(quote.price, Decimal::ZERO);
        assert_eq!(quote.change, Decimal::ZERO);
        assert!(quote.history.is_empty());
    }

    #[test]
    fn test_unsorted_samples_are_sorted_ascending() {
        let quote = Quote::from_history(
            "2330",
            "台積電",
            vec![
                sample((2025, 6, 3), dec!(14.00)),
                sample((2025, 6, 1), dec!(10.00)),
                sample((2025, 6, 2), dec!(12.00)),
            ],
            30,
        );

        let dates: Vec<_> = quote.history.iter().map(|s| s.date.day()).collect();
        assert_eq!(dates, vec![1, 2, 3]);
        // Change uses the two most recent after sorting: 14 - 12.
        assert_eq!(quote.change, dec!(2.00));
    }

    #[test]
    fn test_history_keeps_most_recent_days() {
        let quote = Quote::from_history(
            "2330",
            "台積電",
            vec![
                sample((2025, 6, 1), dec!(10.00)),
                sample((2025, 6, 2), dec!(12.00)),
                sample((2025, 6, 3), dec!(14.00)),
            ],
            2,
        );

        assert_eq!(quote.history.len(), 2);
        assert_eq!(quote.history[0].date.day(), 2);
        assert_eq!(quote.history[1].date.day(), 3);
        // Change is still computed from the full sample set.
        assert_eq!(quote.change, dec!(2.00));
    }

    #[test]
    fn test_updated_at_is_latest_sample_date() {
        let quote = Quote::from_history("2330", "台積電", vec![sample((2025, 6, 2), dec!(25.50))], 1);

        assert_eq!(quote.updated_at.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" 2330.tw ").unwrap(), "2330.TW");
        assert_eq!(normalize_symbol("0050").unwrap(), "0050");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("   ").is_err());
    }
}
