pub mod clock;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use tracing::info;

use clock::{Clock, SystemClock};
use errors::CoreError;
use models::{
    analytics::{Dashboard, EnrichedHolding, PortfolioSummary, SectorSummary},
    holding::Holding,
    price::{CacheStats, ConsolidatedQuote, RefreshOutcome},
};
use providers::{
    fallback::FallbackTable,
    google_finance::GoogleFinanceProvider,
    traits::{FundamentalsProvider, QuoteProvider},
    yahoo_finance::YahooFinanceProvider,
};
use services::{
    analytics_service::AnalyticsService, enrichment_service::EnrichmentService,
    price_service::PriceService,
};
use storage::{holdings_store::HoldingsStore, price_cache::PriceCache};

/// Main entry point for the Portfolio Tracker core library.
///
/// Owns the holdings store and the price cache for its whole lifetime and
/// wires them to the enrichment pipeline. Every view is recomputed per call;
/// only price records are cached.
#[must_use]
pub struct PortfolioTracker {
    store: HoldingsStore,
    cache: Arc<PriceCache>,
    enrichment: EnrichmentService,
    analytics: AnalyticsService,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("holdings", &self.store.len())
            .field("cached_prices", &self.cache.len())
            .field("quote_provider", &self.enrichment.price_service().provider_name())
            .finish()
    }
}

impl PortfolioTracker {
    /// Wire a tracker from its parts. The cache's clock governs freshness.
    pub fn new(
        store: HoldingsStore,
        quote_provider: Box<dyn QuoteProvider>,
        fundamentals_provider: Box<dyn FundamentalsProvider>,
        fallback: FallbackTable,
        cache: Arc<PriceCache>,
    ) -> Self {
        let price_service = PriceService::new(quote_provider, cache.clone(), fallback);
        Self {
            store,
            cache,
            enrichment: EnrichmentService::new(price_service, fundamentals_provider),
            analytics: AnalyticsService::new(),
        }
    }

    /// Tracker backed by Yahoo Finance, Google Finance and the built-in
    /// fallback table, with a system-clock cache.
    pub fn with_default_providers(
        store: HoldingsStore,
        timeout: std::time::Duration,
    ) -> Result<Self, CoreError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Ok(Self::new(
            store,
            Box::new(YahooFinanceProvider::with_timeout(timeout)?),
            Box::new(GoogleFinanceProvider::with_timeout(timeout)?),
            FallbackTable::builtin(),
            Arc::new(PriceCache::with_clock(clock)),
        ))
    }

    // ── Holdings ────────────────────────────────────────────────────

    #[must_use]
    pub fn holdings(&self) -> Vec<Holding> {
        self.store.holdings()
    }

    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        self.store.symbols()
    }

    /// Re-read the holdings file. The previous holdings stay on failure.
    pub fn reload_holdings(&self) -> Result<usize, CoreError> {
        self.store.reload()
    }

    // ── Views ───────────────────────────────────────────────────────

    /// Consolidated quotes for the given symbols, in input order.
    pub async fn fetch_quotes(&self, symbols: &[String]) -> Vec<ConsolidatedQuote> {
        self.enrichment.fetch_all(symbols).await
    }

    /// Every holding with live valuation fields.
    pub async fn enriched_holdings(&self) -> Vec<EnrichedHolding> {
        let holdings = self.store.holdings();
        let quotes = self.enrichment.fetch_all(&self.store.symbols()).await;
        self.analytics.enrich_holdings(&holdings, &quotes)
    }

    pub async fn portfolio_summary(&self) -> PortfolioSummary {
        let enriched = self.enriched_holdings().await;
        self.analytics.portfolio_summary(&enriched)
    }

    pub async fn sector_summaries(&self) -> Vec<SectorSummary> {
        let enriched = self.enriched_holdings().await;
        self.analytics.sector_summaries(&enriched)
    }

    /// Holdings, summary and sectors from a single enrichment run.
    pub async fn dashboard(&self) -> Dashboard {
        let enriched = self.enriched_holdings().await;
        Dashboard {
            summary: self.analytics.portfolio_summary(&enriched),
            sectors: self.analytics.sector_summaries(&enriched),
            holdings: enriched,
        }
    }

    // ── Price cache ─────────────────────────────────────────────────

    /// Drop cached records for `symbols` and enrich exactly those symbols again.
    /// Symbols are trimmed, upper-cased and de-duplicated; blanks are ignored.
    pub async fn refresh_prices(&self, symbols: &[String]) -> RefreshOutcome {
        let symbols = normalize_symbols(symbols);
        for symbol in &symbols {
            self.cache.invalidate(symbol);
        }
        info!("Refreshing {} symbols", symbols.len());
        let quotes = self.enrichment.fetch_all(&symbols).await;
        RefreshOutcome { symbols, quotes }
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Empty the price cache. Returns how many entries were dropped.
    pub fn clear_cache(&self) -> usize {
        let removed = self.cache.clear();
        info!("Cache cleared ({removed} entries)");
        removed
    }
}

/// Trimmed, upper-cased, non-empty symbols with duplicates removed, first occurrence kept.
pub fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.is_empty() && !out.contains(&symbol) {
            out.push(symbol);
        }
    }
    out
}
