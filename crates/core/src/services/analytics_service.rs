use std::collections::HashMap;

use crate::models::analytics::{EnrichedHolding, PortfolioSummary, SectorSummary};
use crate::models::holding::Holding;
use crate::models::price::{ConsolidatedQuote, DEFAULT_CURRENCY};

/// Computes valuation metrics and portfolio/sector aggregates.
///
/// Every holding appears in the output even when enrichment produced nothing
/// for its symbol: such holdings are valued at their purchase price.
/// Percentages are 0 whenever the investment they divide by is 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsService;

/// gain / investment × 100, or 0 when nothing was invested.
fn percentage(gain_loss: f64, investment: f64) -> f64 {
    if investment > 0.0 {
        (gain_loss / investment) * 100.0
    } else {
        0.0
    }
}

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Join holdings with quotes by symbol and derive valuation fields.
    pub fn enrich_holdings(
        &self,
        holdings: &[Holding],
        quotes: &[ConsolidatedQuote],
    ) -> Vec<EnrichedHolding> {
        let by_symbol: HashMap<&str, &ConsolidatedQuote> =
            quotes.iter().map(|q| (q.symbol.as_str(), q)).collect();

        holdings
            .iter()
            .map(|holding| self.enrich(holding, by_symbol.get(holding.symbol.as_str()).copied()))
            .collect()
    }

    /// Value a single holding. A missing quote, or one without a usable
    /// price, values the holding at its purchase price.
    pub fn enrich(&self, holding: &Holding, quote: Option<&ConsolidatedQuote>) -> EnrichedHolding {
        let current_price = quote
            .map(|q| q.current_price)
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(holding.purchase_price);

        let investment = holding.investment();
        let present_value = current_price * holding.quantity;
        let gain_loss = present_value - investment;

        EnrichedHolding {
            holding: holding.clone(),
            current_price,
            pe_ratio: quote.map_or(0.0, |q| q.pe_ratio),
            latest_earnings: quote.map_or(0.0, |q| q.latest_earnings),
            market_cap: quote.map_or(0.0, |q| q.market_cap),
            fifty_two_week_high: quote.map_or(0.0, |q| q.fifty_two_week_high),
            fifty_two_week_low: quote.map_or(0.0, |q| q.fifty_two_week_low),
            investment,
            present_value,
            gain_loss,
            gain_loss_percentage: percentage(gain_loss, investment),
        }
    }

    /// Totals across every enriched holding.
    pub fn portfolio_summary(&self, holdings: &[EnrichedHolding]) -> PortfolioSummary {
        let total_investment: f64 = holdings.iter().map(|h| h.investment).sum();
        let total_present_value: f64 = holdings.iter().map(|h| h.present_value).sum();
        let total_gain_loss = total_present_value - total_investment;

        PortfolioSummary {
            total_investment,
            total_present_value,
            total_gain_loss,
            gain_loss_percentage: percentage(total_gain_loss, total_investment),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// One summary per distinct sector, in order of first appearance.
    /// Each holding lands in exactly one sector.
    pub fn sector_summaries(&self, holdings: &[EnrichedHolding]) -> Vec<SectorSummary> {
        let mut sectors: Vec<SectorSummary> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for enriched in holdings {
            let sector_name = enriched.holding.sector_name.as_str();
            let slot = *index.entry(sector_name).or_insert_with(|| {
                sectors.push(SectorSummary {
                    sector_name: sector_name.to_string(),
                    total_investment: 0.0,
                    total_present_value: 0.0,
                    total_gain_loss: 0.0,
                    gain_loss_percentage: 0.0,
                    holdings: Vec::new(),
                });
                sectors.len() - 1
            });

            let sector = &mut sectors[slot];
            sector.total_investment += enriched.investment;
            sector.total_present_value += enriched.present_value;
            sector.holdings.push(enriched.clone());
        }

        for sector in &mut sectors {
            sector.total_gain_loss = sector.total_present_value - sector.total_investment;
            sector.gain_loss_percentage =
                percentage(sector.total_gain_loss, sector.total_investment);
        }

        sectors
    }
}
