use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Currency assumed when a source does not report one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Where a price record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Live quote from the primary quote service
    PrimarySource,
    /// Built-in fallback table, used when the primary source failed
    Fallback,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::PrimarySource => write!(f, "primary-source"),
            Provenance::Fallback => write!(f, "fallback"),
        }
    }
}

/// Price and fundamentals for one symbol as produced by the primary adapter
/// (or the fallback table). Numeric fields are 0 when the source omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub symbol: String,
    pub current_price: f64,
    pub currency: String,
    pub pe_ratio: f64,
    /// Trailing earnings per share
    pub eps: f64,
    pub market_cap: f64,
    pub fifty_two_week_high: f64,
    pub fifty_two_week_low: f64,
    pub dividend_yield: f64,
    pub timestamp: DateTime<Utc>,
    pub source: Provenance,
}

/// P/E and EPS scraped from the secondary source. Both default to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub pe_ratio: f64,
    pub eps: f64,
}

impl Fundamentals {
    pub fn is_empty(&self) -> bool {
        self.pe_ratio == 0.0 && self.eps == 0.0
    }
}

/// One consolidated record per symbol: the primary record merged with the
/// best available P/E and earnings figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedQuote {
    pub symbol: String,
    pub current_price: f64,
    pub currency: String,
    pub pe_ratio: f64,
    pub latest_earnings: f64,
    pub market_cap: f64,
    pub fifty_two_week_high: f64,
    pub fifty_two_week_low: f64,
    pub dividend_yield: f64,
    pub source: Provenance,
    pub timestamp: DateTime<Utc>,
}

impl ConsolidatedQuote {
    /// Merge a primary record with secondary fundamentals.
    ///
    /// P/E prefers the secondary figure; earnings prefer the primary figure.
    /// Either side falls through to the other when it is zero.
    pub fn merge(primary: &PriceRecord, secondary: Fundamentals, now: DateTime<Utc>) -> Self {
        let pe_ratio = if secondary.pe_ratio != 0.0 {
            secondary.pe_ratio
        } else {
            primary.pe_ratio
        };
        let latest_earnings = if primary.eps != 0.0 {
            primary.eps
        } else {
            secondary.eps
        };

        Self {
            symbol: primary.symbol.clone(),
            current_price: primary.current_price,
            currency: primary.currency.clone(),
            pe_ratio,
            latest_earnings,
            market_cap: primary.market_cap,
            fifty_two_week_high: primary.fifty_two_week_high,
            fifty_two_week_low: primary.fifty_two_week_low,
            dividend_yield: primary.dividend_yield,
            source: primary.source,
            timestamp: now,
        }
    }
}

/// Result of a manual refresh: the symbols actually refreshed, after
/// normalisation, and the quotes that came back for them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshOutcome {
    pub symbols: Vec<String>,
    pub quotes: Vec<ConsolidatedQuote>,
}

/// A cached price record and the instant it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub record: PriceRecord,
    pub stored_at: DateTime<Utc>,
}

/// Diagnostic view of the price cache. Includes stale entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub cached_symbols: usize,
    pub cache_duration_seconds: u64,
    pub symbols: Vec<CacheStatEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatEntry {
    pub symbol: String,
    pub cached_at: DateTime<Utc>,
    pub age_seconds: i64,
}
