use chrono::Utc;
use tracing::{debug, info, warn};

use crate::models::price::{ConsolidatedQuote, Fundamentals};
use crate::providers::traits::FundamentalsProvider;
use crate::services::price_service::PriceService;

/// Builds one consolidated quote per symbol from the price service and the
/// secondary fundamentals provider.
///
/// Symbols are processed one at a time in input order; upstreams are
/// rate-sensitive, so there is no fan-out. A symbol without any price record
/// is left out of the result rather than padded with zeros.
pub struct EnrichmentService {
    price_service: PriceService,
    fundamentals: Box<dyn FundamentalsProvider>,
}

impl EnrichmentService {
    pub fn new(price_service: PriceService, fundamentals: Box<dyn FundamentalsProvider>) -> Self {
        Self {
            price_service,
            fundamentals,
        }
    }

    pub fn price_service(&self) -> &PriceService {
        &self.price_service
    }

    /// Consolidated quotes for `symbols`, in input order, skipping symbols
    /// that produced no price record.
    pub async fn fetch_all(&self, symbols: &[String]) -> Vec<ConsolidatedQuote> {
        let mut quotes = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            match self.fetch_one(symbol).await {
                Some(quote) => quotes.push(quote),
                None => warn!("No price data for {symbol}, skipping"),
            }
        }

        debug!("Enriched {}/{} symbols", quotes.len(), symbols.len());
        quotes
    }

    async fn fetch_one(&self, symbol: &str) -> Option<ConsolidatedQuote> {
        let primary = self.price_service.fetch(symbol).await?;
        let secondary = self.secondary_fundamentals(symbol).await;
        Some(ConsolidatedQuote::merge(&primary, secondary, Utc::now()))
    }

    /// Secondary P/E and EPS. Failures degrade to zeros and never block the pipeline.
    async fn secondary_fundamentals(&self, symbol: &str) -> Fundamentals {
        match self.fundamentals.get_fundamentals(symbol).await {
            Ok(fundamentals) => {
                if !fundamentals.is_empty() {
                    info!(
                        "Fetched {} for {symbol}: PE={}, EPS={}",
                        self.fundamentals.name(),
                        fundamentals.pe_ratio,
                        fundamentals.eps
                    );
                }
                fundamentals
            }
            Err(e) => {
                warn!("Could not fetch {} for {symbol}: {e}", self.fundamentals.name());
                Fundamentals::default()
            }
        }
    }
}
