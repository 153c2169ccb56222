use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::price::{Fundamentals, PriceRecord};

/// Browser identity sent to upstream finance sites, which reject obvious
/// non-browser clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default bound on every outbound call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Primary source: live price plus whatever fundamentals the quote service has.
///
/// Implementations perform exactly one outbound request per call and report
/// every failure (network, timeout, status, payload) as `Err`. Deciding what
/// to do about a failure is the caller's job.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch a quote. The returned record is tagged `Provenance::PrimarySource`.
    async fn get_quote(&self, symbol: &str) -> Result<PriceRecord, CoreError>;
}

/// Secondary source: P/E ratio and EPS only.
///
/// Supplementary by nature. Callers treat `Err` and all-zero results the same way.
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    async fn get_fundamentals(&self, symbol: &str) -> Result<Fundamentals, CoreError>;
}
