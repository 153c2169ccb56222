use serde::{Deserialize, Serialize};

use super::holding::Holding;

/// A holding joined with its consolidated quote plus derived valuation fields.
/// Recomputed on every request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedHolding {
    #[serde(flatten)]
    pub holding: Holding,

    /// Live price, or the purchase price when no quote could be obtained
    pub current_price: f64,
    pub pe_ratio: f64,
    pub latest_earnings: f64,
    pub market_cap: f64,
    pub fifty_two_week_high: f64,
    pub fifty_two_week_low: f64,

    /// purchase_price × quantity
    pub investment: f64,

    /// current_price × quantity
    pub present_value: f64,

    /// present_value − investment
    pub gain_loss: f64,

    /// gain_loss / investment × 100, or 0 when nothing was invested
    pub gain_loss_percentage: f64,
}

/// Aggregate over all holdings sharing a sector name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSummary {
    pub sector_name: String,
    pub total_investment: f64,
    pub total_present_value: f64,
    pub total_gain_loss: f64,
    pub gain_loss_percentage: f64,
    pub holdings: Vec<EnrichedHolding>,
}

/// Aggregate over the whole portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_investment: f64,
    pub total_present_value: f64,
    pub total_gain_loss: f64,
    pub gain_loss_percentage: f64,

    /// Currency used for all monetary values
    pub currency: String,
}

/// All three dashboard views computed from a single enrichment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub holdings: Vec<EnrichedHolding>,
    pub summary: PortfolioSummary,
    pub sectors: Vec<SectorSummary>,
}
