use serde::{Deserialize, Serialize};

/// Sector assigned to holdings whose source row leaves the sector blank.
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// A single equity position loaded from the holdings source.
///
/// Holdings are immutable once loaded. The store only ever yields holdings
/// with a non-empty upper-case symbol and a positive quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Stable row identifier, e.g. "holding-3"
    pub id: String,

    /// Ticker symbol, uppercased (e.g., "AAPL")
    pub symbol: String,

    /// Number of shares held (always > 0)
    pub quantity: f64,

    /// Price paid per share (never negative)
    pub purchase_price: f64,

    /// Sector the holding is grouped under
    pub sector_name: String,
}

impl Holding {
    /// Build a holding, normalising the symbol and sector the way the store does.
    pub fn new(
        id: impl Into<String>,
        symbol: &str,
        quantity: f64,
        purchase_price: f64,
        sector_name: &str,
    ) -> Self {
        let sector = sector_name.trim();
        Self {
            id: id.into(),
            symbol: symbol.trim().to_uppercase(),
            quantity,
            purchase_price,
            sector_name: if sector.is_empty() {
                UNKNOWN_SECTOR.to_string()
            } else {
                sector.to_string()
            },
        }
    }

    /// Whether this holding may enter the store.
    pub fn is_valid(&self) -> bool {
        !self.symbol.is_empty()
            && self.quantity.is_finite()
            && self.quantity > 0.0
            && self.purchase_price.is_finite()
            && self.purchase_price >= 0.0
    }

    /// Cost basis of the position.
    pub fn investment(&self) -> f64 {
        self.purchase_price * self.quantity
    }
}
