use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::holding::Holding;

/// Column positions used when the header row doesn't name a column.
const SYMBOL_COL: usize = 0;
const QUANTITY_COL: usize = 1;
const PURCHASE_PRICE_COL: usize = 2;
const SECTOR_COL: usize = 3;

/// Static list of holdings, loaded once from a CSV file.
///
/// Expected header: `Symbol, Quantity, Purchase Price, Sector`. Rows with an
/// empty symbol, a non-positive quantity or a negative purchase price are
/// dropped. A source that yields no valid holdings is an error, so a store
/// that exists always has at least one holding.
#[derive(Debug)]
pub struct HoldingsStore {
    holdings: RwLock<Vec<Holding>>,
    source: Option<PathBuf>,
}

impl HoldingsStore {
    /// Load holdings from a CSV file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let holdings = Self::read_file(path)?;
        info!("Loaded {} holdings from {}", holdings.len(), path.display());
        Ok(Self {
            holdings: RwLock::new(holdings),
            source: Some(path.to_path_buf()),
        })
    }

    /// Build a store from holdings already in memory. Same validation as `load`.
    pub fn from_holdings(holdings: Vec<Holding>) -> Result<Self, CoreError> {
        let valid: Vec<Holding> = holdings
            .into_iter()
            .filter(|h| {
                let ok = h.is_valid();
                if !ok {
                    warn!("Dropping invalid holding {} ({:?})", h.id, h.symbol);
                }
                ok
            })
            .collect();
        if valid.is_empty() {
            return Err(CoreError::NoHoldings);
        }
        Ok(Self {
            holdings: RwLock::new(valid),
            source: None,
        })
    }

    /// Parse holdings from any CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<Holding>, CoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |names: &[&str], default: usize| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
                .unwrap_or(default)
        };
        let symbol_col = column(&["symbol", "ticker"], SYMBOL_COL);
        let quantity_col = column(&["quantity", "qty", "shares"], QUANTITY_COL);
        let price_col = column(&["purchase price", "purchase_price"], PURCHASE_PRICE_COL);
        let sector_col = column(&["sector", "sector name", "sector_name"], SECTOR_COL);

        let mut holdings = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let field = |col: usize| record.get(col).unwrap_or("");
            let number = |col: usize| field(col).replace(',', "").parse::<f64>().unwrap_or(0.0);

            let holding = Holding::new(
                format!("holding-{index}"),
                field(symbol_col),
                number(quantity_col),
                number(price_col),
                field(sector_col),
            );

            if holding.is_valid() {
                holdings.push(holding);
            } else {
                warn!(
                    "Skipping holdings row {}: symbol={:?} quantity={} purchase_price={}",
                    index + 1,
                    holding.symbol,
                    holding.quantity,
                    holding.purchase_price
                );
            }
        }

        if holdings.is_empty() {
            return Err(CoreError::NoHoldings);
        }
        Ok(holdings)
    }

    /// All holdings, in source order.
    pub fn holdings(&self) -> Vec<Holding> {
        self.holdings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Distinct symbols in source order.
    pub fn symbols(&self) -> Vec<String> {
        let holdings = self.holdings.read().unwrap_or_else(|e| e.into_inner());
        let mut symbols: Vec<String> = Vec::with_capacity(holdings.len());
        for h in holdings.iter() {
            if !symbols.contains(&h.symbol) {
                symbols.push(h.symbol.clone());
            }
        }
        symbols
    }

    /// Holdings whose symbol is in `symbols` (case-insensitive).
    pub fn holdings_by_symbols(&self, symbols: &[String]) -> Vec<Holding> {
        let wanted: Vec<String> = symbols.iter().map(|s| s.trim().to_uppercase()).collect();
        self.holdings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|h| wanted.contains(&h.symbol))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.holdings.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-read the backing file. On failure the current holdings are kept.
    /// Returns the number of holdings now loaded.
    pub fn reload(&self) -> Result<usize, CoreError> {
        let path = self.source.as_ref().ok_or_else(|| {
            CoreError::HoldingsSource("store was not loaded from a file".into())
        })?;
        let fresh = Self::read_file(path)?;
        let count = fresh.len();
        *self.holdings.write().unwrap_or_else(|e| e.into_inner()) = fresh;
        info!("Reloaded {} holdings from {}", count, path.display());
        Ok(count)
    }

    fn read_file(path: &Path) -> Result<Vec<Holding>, CoreError> {
        let file = std::fs::File::open(path).map_err(|e| {
            CoreError::FileIO(format!("Cannot open holdings file {}: {e}", path.display()))
        })?;
        Self::parse(file)
    }
}
