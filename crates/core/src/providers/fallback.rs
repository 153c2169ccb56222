use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::price::{PriceRecord, Provenance, DEFAULT_CURRENCY};

/// Plausible price and fundamentals for one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackQuote {
    pub current_price: f64,
    pub pe_ratio: f64,
    pub eps: f64,
    pub market_cap: f64,
    pub fifty_two_week_high: f64,
    pub fifty_two_week_low: f64,
    pub dividend_yield: f64,
}

const BUILTIN: &[(&str, FallbackQuote)] = &[
    ("AAPL", FallbackQuote { current_price: 195.45, pe_ratio: 28.5, eps: 6.05, market_cap: 2.8e12, fifty_two_week_high: 199.62, fifty_two_week_low: 124.17, dividend_yield: 0.005 }),
    ("MSFT", FallbackQuote { current_price: 425.30, pe_ratio: 32.1, eps: 11.25, market_cap: 3.2e12, fifty_two_week_high: 445.10, fifty_two_week_low: 275.00, dividend_yield: 0.007 }),
    ("GOOGL", FallbackQuote { current_price: 165.80, pe_ratio: 24.3, eps: 6.75, market_cap: 1.1e12, fifty_two_week_high: 192.30, fifty_two_week_low: 102.21, dividend_yield: 0.0 }),
    ("AMZN", FallbackQuote { current_price: 180.50, pe_ratio: 42.8, eps: 4.20, market_cap: 1.9e12, fifty_two_week_high: 198.88, fifty_two_week_low: 81.43, dividend_yield: 0.0 }),
    ("JPM", FallbackQuote { current_price: 205.75, pe_ratio: 12.5, eps: 16.45, market_cap: 589e9, fifty_two_week_high: 223.50, fifty_two_week_low: 144.35, dividend_yield: 0.025 }),
    ("BAC", FallbackQuote { current_price: 35.90, pe_ratio: 10.2, eps: 3.52, market_cap: 312e9, fifty_two_week_high: 40.25, fifty_two_week_low: 28.12, dividend_yield: 0.028 }),
    ("JNJ", FallbackQuote { current_price: 158.20, pe_ratio: 15.8, eps: 10.00, market_cap: 416e9, fifty_two_week_high: 165.79, fifty_two_week_low: 143.70, dividend_yield: 0.031 }),
    ("PFE", FallbackQuote { current_price: 26.45, pe_ratio: 11.3, eps: 2.34, market_cap: 147e9, fifty_two_week_high: 40.05, fifty_two_week_low: 23.85, dividend_yield: 0.062 }),
    ("PG", FallbackQuote { current_price: 168.90, pe_ratio: 27.2, eps: 6.20, market_cap: 408e9, fifty_two_week_high: 186.14, fifty_two_week_low: 129.50, dividend_yield: 0.024 }),
    ("WMT", FallbackQuote { current_price: 89.50, pe_ratio: 31.5, eps: 2.84, market_cap: 233e9, fifty_two_week_high: 99.98, fifty_two_week_low: 70.28, dividend_yield: 0.013 }),
];

/// Read-only table of last-resort quotes, consulted only when the primary
/// source fails and nothing fresh is cached. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct FallbackTable {
    quotes: HashMap<String, FallbackQuote>,
}

impl FallbackTable {
    /// The built-in table of large-cap US equities.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN.iter().map(|(s, q)| (s.to_string(), *q)))
    }

    /// A table with no entries; every lookup misses.
    pub fn empty() -> Self {
        Self {
            quotes: HashMap::new(),
        }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, FallbackQuote)>) -> Self {
        Self {
            quotes: entries
                .into_iter()
                .map(|(symbol, quote)| (symbol.to_uppercase(), quote))
                .collect(),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&FallbackQuote> {
        self.quotes.get(&symbol.to_uppercase())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// A fallback-tagged record for `symbol`, if the table knows it.
    pub fn record_for(&self, symbol: &str, now: DateTime<Utc>) -> Option<PriceRecord> {
        let quote = self.get(symbol)?;
        Some(PriceRecord {
            symbol: symbol.to_uppercase(),
            current_price: quote.current_price,
            currency: DEFAULT_CURRENCY.to_string(),
            pe_ratio: quote.pe_ratio,
            eps: quote.eps,
            market_cap: quote.market_cap,
            fifty_two_week_high: quote.fifty_two_week_high,
            fifty_two_week_low: quote.fifty_two_week_low,
            dividend_yield: quote.dividend_yield,
            timestamp: now,
            source: Provenance::Fallback,
        })
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self::builtin()
    }
}
