use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::models::price::PriceRecord;
use crate::providers::fallback::FallbackTable;
use crate::providers::traits::QuoteProvider;
use crate::storage::price_cache::PriceCache;

/// Fetches a symbol's price record through the cache, the primary quote
/// provider and the fallback table, in that order.
///
/// Fetch strategy:
/// - **Fresh cache entry**: returned as is, no network access.
/// - **Cache miss**: one call to the primary provider; a successful record
///   is cached and returned.
/// - **Primary failure**: the fallback table is consulted. A hit is cached
///   too, so a flaky upstream isn't hammered again until the entry expires.
///   A miss yields `None`.
///
/// Provider failures never escape this service.
pub struct PriceService {
    provider: Box<dyn QuoteProvider>,
    cache: Arc<PriceCache>,
    fallback: FallbackTable,
}

impl PriceService {
    pub fn new(
        provider: Box<dyn QuoteProvider>,
        cache: Arc<PriceCache>,
        fallback: FallbackTable,
    ) -> Self {
        Self {
            provider,
            cache,
            fallback,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Best available price record for `symbol`, or `None` when the primary
    /// source failed and the fallback table doesn't know the symbol.
    pub async fn fetch(&self, symbol: &str) -> Option<PriceRecord> {
        let symbol = symbol.to_uppercase();

        if let Some(record) = self.cache.get(&symbol) {
            debug!("Using cached data for {symbol}");
            return Some(record);
        }

        match self.provider.get_quote(&symbol).await {
            Ok(record) => {
                info!("Fetched {} data for {symbol}", self.provider.name());
                self.cache.put(&symbol, record.clone());
                Some(record)
            }
            Err(e) => {
                warn!("Error fetching {symbol}: {e}");
                let record = self.fallback.record_for(&symbol, Utc::now())?;
                info!("Using fallback data for {symbol}");
                self.cache.put(&symbol, record.clone());
                Some(record)
            }
        }
    }
}
